//! Error types for the datadesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all datadesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Transcript protocol errors ---
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the LLM backend. These are the only errors that
/// unwind a conversation.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Registry-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// What a tool handler reports when it cannot produce a result.
///
/// The executor never propagates these; it renders them into an
/// `{"error": ...}` payload the model sees as an ordinary tool result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The backend could not be reached at all.
    #[error("Could not connect to API: {0}")]
    Connection(String),

    /// The backend answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// The lookup ran but matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// Anything else (bad arguments, unreadable data, malformed payloads).
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Render this failure as the JSON object handed back to the model.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

/// Violations of the tool_call / tool_result pairing rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("No tool calls are awaiting results")]
    NoPendingToolCalls,

    #[error("Expected {expected} tool results, got {got}")]
    ResultCountMismatch { expected: usize, got: usize },

    #[error("Tool result {position} references '{got}', expected '{expected}'")]
    ResultIdMismatch {
        position: usize,
        expected: String,
        got: String,
    },

    #[error("{pending} tool calls are still awaiting results")]
    ToolResultsOutstanding { pending: usize },

    #[error("Expected a {expected} message, got {got}")]
    UnexpectedRole { expected: String, got: String },
}
