//! LLM provider implementations for datadesk.
//!
//! All providers implement the `datadesk_core::Provider` trait. Only the
//! Anthropic Messages API is supported.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
