//! Streaming types for AI responses

/// Parts that can be streamed from the model.
///
/// The channel closing after `Done` (or after a single `Error`) is the
/// end-of-stream signal; no further events follow either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text delta
    TextDelta { delta: String },

    /// The provider signalled end-of-stream
    Done,

    /// Transport or API failure, rendered in place of stream content
    Error { message: String },
}
