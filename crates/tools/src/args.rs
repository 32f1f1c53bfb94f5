//! Argument extraction shared by the built-in handlers.

use datadesk_core::HandlerError;
use datadesk_core::tool::Arguments;
use serde_json::Value;

/// An optional string argument. Empty strings count as absent.
pub(crate) fn optional_str<'a>(
    args: &'a Arguments,
    key: &str,
) -> Result<Option<&'a str>, HandlerError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(HandlerError::Failed(format!(
            "Argument '{key}' must be a string, got {other}"
        ))),
    }
}

pub(crate) fn required_str<'a>(args: &'a Arguments, key: &str) -> Result<&'a str, HandlerError> {
    optional_str(args, key)?
        .ok_or_else(|| HandlerError::Failed(format!("Missing required argument '{key}'")))
}

/// An optional integer argument. Numeric strings are accepted.
pub(crate) fn optional_int(args: &Arguments, key: &str) -> Result<Option<i64>, HandlerError> {
    let invalid = || HandlerError::Failed(format!("Argument '{key}' must be an integer"));
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// A required numeric argument. Numeric strings are accepted.
pub(crate) fn required_f64(args: &Arguments, key: &str) -> Result<f64, HandlerError> {
    let invalid = || HandlerError::Failed(format!("Argument '{key}' must be a number"));
    match args.get(key) {
        None | Some(Value::Null) => Err(HandlerError::Failed(format!(
            "Missing required argument '{key}'"
        ))),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn strings() {
        let a = args(json!({"name": "Kim", "blank": "  ", "n": 3}));
        assert_eq!(optional_str(&a, "name").unwrap(), Some("Kim"));
        assert_eq!(optional_str(&a, "blank").unwrap(), None);
        assert_eq!(optional_str(&a, "missing").unwrap(), None);
        assert!(optional_str(&a, "n").is_err());
        assert_eq!(
            required_str(&a, "missing").unwrap_err(),
            HandlerError::Failed("Missing required argument 'missing'".into())
        );
    }

    #[test]
    fn numbers() {
        let a = args(json!({"id": 7, "sid": "12", "bad": "x", "amount": "10.5"}));
        assert_eq!(optional_int(&a, "id").unwrap(), Some(7));
        assert_eq!(optional_int(&a, "sid").unwrap(), Some(12));
        assert!(optional_int(&a, "bad").is_err());
        assert_eq!(required_f64(&a, "amount").unwrap(), 10.5);
        assert_eq!(required_f64(&a, "id").unwrap(), 7.0);
        assert!(required_f64(&a, "missing").is_err());
    }
}
