//! AI provider integration
//!
//! - OpenAI-compatible chat-completions client
//! - SSE response parsing with partial-chunk buffering
//! - Event types carried over the stream channel

pub mod client;
pub mod sse;
pub mod streaming;

pub use client::{AiClient, SYSTEM_PROMPT};
pub use streaming::StreamEvent;
