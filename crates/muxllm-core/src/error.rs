//! Error types for muxllm
//!
//! Configuration and transport failures. Wrapping itself never fails: the
//! wrapper accepts any input and always produces a defined result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MuxllmError {
    /// The API key precondition is checked before any request is built.
    #[error("MUXLLM_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid popup width {0:?} (expected columns like \"120\" or a percentage like \"90%\")")]
    InvalidPopupWidth(String),

    #[error("invalid terminal width {0:?}")]
    InvalidTerminalWidth(String),

    /// Non-2xx response whose body carried no usable API error message.
    #[error("HTTP Error {status}: {message}")]
    Http { status: u16, message: String },

    /// Non-2xx response with an `{"error": {"message": ...}}` body.
    #[error("API Error: {0}")]
    Api(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}
