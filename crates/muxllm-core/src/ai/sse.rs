//! SSE (Server-Sent Events) stream processing
//!
//! Turns the raw byte chunks of a chat-completions response into
//! [`StreamEvent`]s. Chunks may split anywhere, including inside a UTF-8
//! sequence, so the carry buffer holds bytes and only complete lines are
//! decoded.

use std::time::Instant;

use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::streaming::StreamEvent;

/// One parsed `data:` payload of the chat-completions stream.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// SSE stream processor that handles partial lines and buffering
pub struct SseStreamProcessor {
    /// Accumulated bytes of a line not yet terminated by a newline
    partial_line: Vec<u8>,
    /// Channel the parsed events are sent on
    tx: mpsc::UnboundedSender<StreamEvent>,
    /// When the stream started
    stream_start: Instant,
    /// Event counter for logging
    event_count: usize,
    /// Bytes received counter
    bytes_received: usize,
    /// Set once the `[DONE]` marker has been seen
    done: bool,
}

impl SseStreamProcessor {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        debug!("SSE stream processor created");
        Self {
            partial_line: Vec::new(),
            tx,
            stream_start: Instant::now(),
            event_count: 0,
            bytes_received: 0,
            done: false,
        }
    }

    /// True once the provider marked the stream complete.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Process a chunk of bytes from the SSE stream.
    pub fn process_chunk(&mut self, bytes: Bytes) {
        if self.done {
            return;
        }
        self.bytes_received += bytes.len();
        debug!(
            "SSE chunk received: {} bytes (total: {} bytes)",
            bytes.len(),
            self.bytes_received
        );
        self.partial_line.extend_from_slice(&bytes);

        while let Some(newline) = self.partial_line.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.partial_line.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            self.process_line(line.trim_end_matches(['\r', '\n']));
            if self.done {
                self.partial_line.clear();
                return;
            }
        }
    }

    fn process_line(&mut self, line: &str) {
        // Skip empty lines and SSE comments
        if line.is_empty() || line.starts_with(':') {
            return;
        }
        if let Some(data) = line.strip_prefix("data: ") {
            self.process_sse_data(data.trim());
        }
    }

    /// Handle one `data:` payload: the `[DONE]` marker, a delta, or junk.
    fn process_sse_data(&mut self, data: &str) {
        self.event_count += 1;
        let elapsed = self.stream_start.elapsed();

        if data == "[DONE]" {
            info!(
                "SSE stream [DONE] marker received after {:?}, {} events, {} bytes",
                elapsed, self.event_count, self.bytes_received
            );
            self.done = true;
            let _ = self.tx.send(StreamEvent::Done);
            return;
        }

        match serde_json::from_str::<ChatChunk>(data) {
            Ok(chunk) => {
                let Some(choice) = chunk.choices.into_iter().next() else {
                    debug!("SSE event #{} carried no choices", self.event_count);
                    return;
                };
                if let Some(reason) = &choice.finish_reason {
                    info!("SSE finish_reason={} at {:?}", reason, elapsed);
                }
                if let Some(content) = choice.delta.content {
                    if !content.is_empty() {
                        debug!("  -> TextDelta: {} chars", content.len());
                        let _ = self.tx.send(StreamEvent::TextDelta { delta: content });
                    }
                }
            }
            // Malformed events are skipped, never fatal.
            Err(err) => {
                warn!(
                    "Failed to parse SSE JSON (event #{}): {}",
                    self.event_count, err
                );
            }
        }
    }

    /// Log totals once the transport is drained.
    pub fn finish(&self) {
        let elapsed = self.stream_start.elapsed();
        info!(
            "SSE stream finished: {:?} elapsed, {} events, {} bytes total",
            elapsed, self.event_count, self.bytes_received
        );
    }
}
