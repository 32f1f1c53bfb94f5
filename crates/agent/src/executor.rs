//! Turns `tool_call` blocks into `tool_result` blocks.
//!
//! The executor is the boundary where tool failures stop being errors: an
//! unknown tool name, a handler failure or even a handler panic all come back
//! as an ordinary result whose content is `{"error": "..."}`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use datadesk_core::error::HandlerError;
use datadesk_core::message::{ToolCall, ToolResult};
use datadesk_core::tool::ToolRegistry;
use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, warn};

/// Stateless dispatcher over a shared, read-only registry.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one call. Never fails.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let start = Instant::now();

        let outcome = match self.registry.lookup(&call.name) {
            Ok(handler) => AssertUnwindSafe(handler.invoke(&call.arguments))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(HandlerError::Failed(format!("Tool '{}' panicked", call.name)))
                })
                .map_err(|e| e.to_payload()),
            Err(e) => Err(serde_json::json!({ "error": e.to_string() })),
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(value) => {
                debug!(tool = %call.name, call_id = %call.id, duration_ms, "Tool executed");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content: value.to_string(),
                    is_error: false,
                }
            }
            Err(payload) => {
                warn!(
                    tool = %call.name,
                    call_id = %call.id,
                    duration_ms,
                    error = %payload["error"],
                    "Tool execution failed"
                );
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content: payload.to_string(),
                    is_error: true,
                }
            }
        }
    }

    /// Execute a batch and return results in call order.
    ///
    /// With `concurrent` set the handlers run together; the results are still
    /// reassembled in the order of `calls`.
    pub async fn execute_batch(&self, calls: &[ToolCall], concurrent: bool) -> Vec<ToolResult> {
        if concurrent {
            return join_all(calls.iter().map(|call| self.execute(call))).await;
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use datadesk_core::tool::{Arguments, ToolHandler, ToolSpec, handler_fn};
    use serde_json::{Value, json};
    use std::time::Duration;

    fn spec(name: &str) -> ToolSpec {
        ToolSpec::new(name, "test tool", json!({"type": "object", "properties": {}}))
    }

    fn call(id: &str, name: &str, args: Value) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: args.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Sleeps for `ms` milliseconds, then echoes its tag.
    struct SlowEcho;

    #[async_trait]
    impl ToolHandler for SlowEcho {
        async fn invoke(&self, args: &Arguments) -> Result<Value, HandlerError> {
            let ms = args.get("ms").and_then(Value::as_u64).unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(json!({ "tag": args.get("tag").cloned().unwrap_or(Value::Null) }))
        }
    }

    struct Panics;

    #[async_trait]
    impl ToolHandler for Panics {
        async fn invoke(&self, _args: &Arguments) -> Result<Value, HandlerError> {
            panic!("boom");
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                spec("employees"),
                Arc::new(handler_fn(|_| Ok(json!({"count": 2, "employees": []})))),
            )
            .unwrap();
        registry
            .register(
                spec("offline"),
                Arc::new(handler_fn(|_| {
                    Err(HandlerError::Connection("http://localhost:8001".into()))
                })),
            )
            .unwrap();
        registry
            .register(
                spec("status"),
                Arc::new(handler_fn(|_| {
                    Err(HandlerError::RemoteStatus {
                        status: 404,
                        body: "missing".into(),
                    })
                })),
            )
            .unwrap();
        registry.register(spec("slow"), Arc::new(SlowEcho)).unwrap();
        registry.register(spec("panics"), Arc::new(Panics)).unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    fn content(result: &ToolResult) -> Value {
        serde_json::from_str(&result.content).unwrap()
    }

    #[tokio::test]
    async fn success_is_serialized_json() {
        let result = executor().execute(&call("c1", "employees", json!({}))).await;
        assert_eq!(result.tool_call_id, "c1");
        assert!(!result.is_error);
        assert_eq!(content(&result)["count"], 2);
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_payload() {
        let result = executor().execute(&call("c2", "teleport", json!({}))).await;
        assert_eq!(result.tool_call_id, "c2");
        assert!(result.is_error);
        assert_eq!(content(&result), json!({"error": "Unknown tool: teleport"}));
    }

    #[tokio::test]
    async fn handler_failures_are_classified() {
        let exec = executor();

        let result = exec.execute(&call("a", "offline", json!({}))).await;
        assert_eq!(
            content(&result),
            json!({"error": "Could not connect to API: http://localhost:8001"})
        );

        let result = exec.execute(&call("b", "status", json!({}))).await;
        assert_eq!(
            content(&result),
            json!({"error": "API returned HTTP 404: missing"})
        );
    }

    #[tokio::test]
    async fn panicking_handler_is_contained() {
        let result = executor().execute(&call("p", "panics", json!({}))).await;
        assert!(result.is_error);
        assert_eq!(content(&result), json!({"error": "Tool 'panics' panicked"}));
    }

    /// Containment needs unwinding; an aborting release build would take the
    /// whole process down instead.
    #[test]
    fn release_profiles_unwind_on_panic() {
        let manifest: toml::Value =
            toml::from_str(include_str!("../../../Cargo.toml")).unwrap();
        let profiles = &manifest["profile"];
        for name in ["release", "release-fast"] {
            let panic = profiles[name]
                .get("panic")
                .or_else(|| profiles["release"].get("panic"))
                .and_then(|v| v.as_str())
                .unwrap_or("unwind");
            assert_eq!(panic, "unwind", "profile.{name}");
        }
    }

    #[tokio::test]
    async fn batch_preserves_call_order() {
        let calls = vec![
            call("first", "slow", json!({"ms": 40, "tag": 1})),
            call("second", "teleport", json!({})),
            call("third", "slow", json!({"ms": 1, "tag": 3})),
        ];

        for concurrent in [false, true] {
            let results = executor().execute_batch(&calls, concurrent).await;
            let ids: Vec<_> = results.iter().map(|r| r.tool_call_id.as_str()).collect();
            assert_eq!(ids, vec!["first", "second", "third"]);
            assert_eq!(content(&results[0])["tag"], 1);
            assert!(results[1].is_error);
            assert_eq!(content(&results[2])["tag"], 3);
        }
    }
}
