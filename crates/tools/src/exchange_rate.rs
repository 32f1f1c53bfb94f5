//! Live exchange rates from a public USD-based rate table.
//!
//! One handler type serves both `get_exchange_rate` and `convert_currency`;
//! the table is fetched on every call.

use async_trait::async_trait;
use datadesk_config::EndpointsConfig;
use datadesk_core::HandlerError;
use datadesk_core::tool::{Arguments, ToolHandler, ToolSpec};
use serde_json::{Value, json};

use crate::args::{required_f64, required_str};
use crate::http::HttpBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMode {
    Lookup,
    Convert,
}

pub struct ExchangeRateTool {
    http: HttpBackend,
    url: String,
    mode: RateMode,
}

/// The fields of the rate table this tool reads.
struct RateTable {
    rates: serde_json::Map<String, Value>,
    base: String,
    timestamp: String,
}

impl RateTable {
    fn from_json(data: &Value) -> Result<Self, HandlerError> {
        let rates = data
            .get("rates")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| HandlerError::Failed("Rate table has no 'rates' object".into()))?;
        let text = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string()
        };
        Ok(Self {
            rates,
            base: text("base_code"),
            timestamp: text("time_last_update_utc"),
        })
    }

    fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).and_then(Value::as_f64)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl ExchangeRateTool {
    pub fn new(http: HttpBackend, endpoints: &EndpointsConfig, mode: RateMode) -> Self {
        Self {
            http,
            url: endpoints.exchange_rates_url.clone(),
            mode,
        }
    }

    pub fn spec(&self) -> ToolSpec {
        match self.mode {
            RateMode::Lookup => ToolSpec::new(
                "get_exchange_rate",
                "Get the current exchange rate for a specific currency relative to USD.",
                json!({
                    "type": "object",
                    "properties": {
                        "currency_code": {
                            "type": "string",
                            "description": "The target currency code (e.g. 'EUR', 'INR', 'GBP', 'JPY')."
                        }
                    },
                    "required": ["currency_code"]
                }),
            ),
            RateMode::Convert => ToolSpec::new(
                "convert_currency",
                "Convert an amount from one currency to another using live exchange rates.",
                json!({
                    "type": "object",
                    "properties": {
                        "amount": {
                            "type": "number",
                            "description": "Amount to convert."
                        },
                        "from_currency": {
                            "type": "string",
                            "description": "Source currency code (e.g. 'USD')."
                        },
                        "to_currency": {
                            "type": "string",
                            "description": "Target currency code (e.g. 'EUR')."
                        }
                    },
                    "required": ["amount", "from_currency", "to_currency"]
                }),
            ),
        }
    }

    async fn fetch(&self) -> Result<RateTable, HandlerError> {
        let data = self.http.get_json(&self.url, &[]).await?;
        RateTable::from_json(&data)
    }

    async fn lookup(&self, arguments: &Arguments) -> Result<Value, HandlerError> {
        let code = required_str(arguments, "currency_code")?.to_uppercase();
        let table = self.fetch().await?;
        Ok(match table.rate(&code) {
            Some(rate) => json!({
                "currency": code,
                "rate": rate,
                "base": table.base,
                "timestamp": table.timestamp,
            }),
            None => json!({}),
        })
    }

    async fn convert(&self, arguments: &Arguments) -> Result<Value, HandlerError> {
        let amount = required_f64(arguments, "amount")?;
        let from = required_str(arguments, "from_currency")?.to_uppercase();
        let to = required_str(arguments, "to_currency")?.to_uppercase();
        let table = self.fetch().await?;

        let (Some(from_rate), Some(to_rate)) = (table.rate(&from), table.rate(&to)) else {
            return Err(HandlerError::NotFound(format!(
                "One or both currencies not found ({from}, {to})"
            )));
        };
        if from_rate == 0.0 {
            return Err(HandlerError::Failed(format!("Rate for {from} is zero")));
        }

        let converted = amount / from_rate * to_rate;
        Ok(json!({
            "original_amount": amount,
            "from_currency": from,
            "to_currency": to,
            "converted_amount": round_to(converted, 2),
            "exchange_rate": round_to(to_rate / from_rate, 6),
            "base_currency": table.base,
        }))
    }
}

#[async_trait]
impl ToolHandler for ExchangeRateTool {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value, HandlerError> {
        match self.mode {
            RateMode::Lookup => self.lookup(arguments).await,
            RateMode::Convert => self.convert(arguments).await,
        }
    }
}
