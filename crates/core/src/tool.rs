//! Tool abstractions: what the model is allowed to call.
//!
//! A tool is a [`ToolSpec`] (shown to the model) paired with a
//! [`ToolHandler`] (which does the work). The [`ToolRegistry`] holds the
//! closed set available to a conversation and is read-only once built.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{HandlerError, ToolError};

/// Named arguments passed to a handler.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// Static description of a tool, sent verbatim to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name
    pub name: String,

    /// What the tool does (shown to the model)
    pub description: String,

    /// JSON Schema for the accepted arguments
    pub input_schema: serde_json::Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// The executable half of a tool.
///
/// Handlers may perform I/O. They report failures through [`HandlerError`]
/// and never panic on bad input.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, arguments: &Arguments) -> Result<serde_json::Value, HandlerError>;
}

/// Adapter turning a plain closure into a [`ToolHandler`].
pub struct FnHandler<F>(F);

/// Wrap a synchronous closure as a handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Arguments) -> Result<serde_json::Value, HandlerError> + Send + Sync,
{
    FnHandler(f)
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(&Arguments) -> Result<serde_json::Value, HandlerError> + Send + Sync,
{
    async fn invoke(&self, arguments: &Arguments) -> Result<serde_json::Value, HandlerError> {
        (self.0)(arguments)
    }
}

struct Entry {
    spec: ToolSpec,
    handler: Arc<dyn ToolHandler>,
}

/// The closed set of tools for a conversation.
///
/// Entries keep registration order so the schema sent to the model is
/// identical from run to run.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), ToolError> {
        if self.index.contains_key(&spec.name) {
            return Err(ToolError::DuplicateTool(spec.name));
        }
        self.index.insert(spec.name.clone(), self.entries.len());
        self.entries.push(Entry { spec, handler });
        Ok(())
    }

    /// Find the handler for a tool name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i].handler))
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Every spec, in registration order.
    pub fn describe_all(&self) -> Vec<ToolSpec> {
        self.entries.iter().map(|e| e.spec.clone()).collect()
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.spec.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_spec(name: &str) -> ToolSpec {
        ToolSpec::new(
            name,
            "Echoes back the input",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            }),
        )
    }

    fn echo() -> Arc<dyn ToolHandler> {
        Arc::new(handler_fn(|args| {
            Ok(args.get("text").cloned().unwrap_or(serde_json::Value::Null))
        }))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_spec("echo"), echo()).unwrap();
        assert!(registry.lookup("echo").is_ok());
        assert_eq!(
            registry.lookup("nonexistent").err(),
            Some(ToolError::UnknownTool("nonexistent".into()))
        );
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_spec("echo"), echo()).unwrap();
        let err = registry.register(echo_spec("echo"), echo()).unwrap_err();
        assert_eq!(err, ToolError::DuplicateTool("echo".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn describe_all_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(echo_spec(name), echo()).unwrap();
        }
        let first = registry.describe_all();
        let second = registry.describe_all();
        assert_eq!(first, second);
        let names: Vec<_> = first.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), names);
    }

    #[tokio::test]
    async fn fn_handler_invokes_closure() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_spec("echo"), echo()).unwrap();

        let mut args = Arguments::new();
        args.insert("text".into(), serde_json::json!("hello world"));
        let value = registry.lookup("echo").unwrap().invoke(&args).await.unwrap();
        assert_eq!(value, "hello world");
    }

    #[test]
    fn spec_serializes_input_schema() {
        let json = serde_json::to_value(echo_spec("echo")).unwrap();
        assert_eq!(json["input_schema"]["type"], "object");
        assert_eq!(json["input_schema"]["required"][0], "text");
    }
}
