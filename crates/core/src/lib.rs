//! # datadesk core
//!
//! Domain types, traits, and error definitions for the datadesk tool-use agent.
//! This crate performs no I/O. It defines the transcript model, the tool
//! contract and the provider seam that every other crate builds on.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, HandlerError, ProviderError, Result, ToolError, TranscriptError};
pub use message::{
    ContentBlock, ConversationId, Message, MessageContent, Role, ToolCall, ToolResult, Transcript,
};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StopReason, Usage};
pub use tool::{Arguments, FnHandler, ToolHandler, ToolRegistry, ToolSpec, handler_fn};
