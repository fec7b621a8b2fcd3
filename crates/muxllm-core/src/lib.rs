//! Core library for muxllm
//!
//! Streams chat completions from an OpenAI-compatible API and wraps the
//! response text to a fixed width as it arrives, so it can be piped
//! directly into a tmux popup. The CLI crate owns stdin/stdout and
//! signal handling; everything else lives here.

pub mod ai;
pub mod config;
pub mod error;
pub mod wrap;

pub use ai::{AiClient, StreamEvent};
pub use config::{ApiConfig, PopupGeometry, PopupWidth};
pub use error::MuxllmError;
pub use wrap::StreamingWrapper;
