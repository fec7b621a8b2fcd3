//! HTTP client for streaming chat completions
//!
//! Sends one OpenAI-format request per invocation and forwards the SSE
//! response through a channel of [`StreamEvent`]s. Transport and API
//! failures arrive on the same channel as a single `Error` event so the
//! consumer has one place to render everything.

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::error::MuxllmError;

use super::sse::SseStreamProcessor;
use super::streaming::StreamEvent;

/// System prompt sent with every request.
///
/// The response lands in a small non-interactive popup, so the model is
/// steered toward short, self-contained answers.
pub const SYSTEM_PROMPT: &str = "You are an assistant designed to provide concise, helpful responses that will be displayed \
in a mid-sized, non-interactive popup window. Your responses should be:\n\n\
- Concise but complete (you must fit roughly within 20 lines)\n\
- Directly actionable when possible\n\
- Complete and self-contained (no follow-up questions)\n\
- Focused on the most likely helpful information\n\n\
Do not ask for clarification or additional information. Work with what you're given and \
provide the best possible answer based on the available context.\n\n\
Never provide lists, bullet points, or numbered items with more than three items. \
Use short sentences and paragraphs. Be very concise!";

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct AiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl AiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn build_payload(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "stream": true,
            "temperature": 0.7,
        })
    }

    /// Start a streaming completion for `prompt`.
    ///
    /// Returns immediately; events arrive on the receiver as the provider
    /// produces them. Cancelling `cancel` stops the transfer without an
    /// `Error` event. Any failure surfaces as one `Error` event and the
    /// channel closes.
    pub fn stream_completion(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> mpsc::UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        info!(
            "Streaming completion: endpoint={} model={}",
            self.config.endpoint, self.config.model
        );
        let request = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&self.build_payload(prompt));

        tokio::spawn(async move {
            if let Err(err) = run_stream(request, tx.clone(), cancel).await {
                error!("Streaming request failed: {}", err);
                let _ = tx.send(StreamEvent::Error {
                    message: err.to_string(),
                });
            }
        });

        rx
    }
}

/// Drive one request to completion, feeding the SSE processor.
async fn run_stream(
    request: reqwest::RequestBuilder,
    tx: mpsc::UnboundedSender<StreamEvent>,
    cancel: CancellationToken,
) -> Result<(), MuxllmError> {
    let response = request.send().await?;
    let response = handle_error_response(response).await?;
    debug!("Response headers received, reading SSE body");

    let mut processor = SseStreamProcessor::new(tx);
    let mut body = response.bytes_stream();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Stream cancelled, dropping connection");
                return Ok(());
            }
            chunk = body.next() => match chunk {
                Some(Ok(bytes)) => {
                    processor.process_chunk(bytes);
                    if processor.is_done() {
                        break;
                    }
                }
                Some(Err(err)) => return Err(err.into()),
                None => break,
            }
        }
    }

    processor.finish();
    Ok(())
}

/// Map a non-2xx response to an error, preferring the API's own message.
async fn handle_error_response(response: reqwest::Response) -> Result<reqwest::Response, MuxllmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
    let body = response.text().await.unwrap_or_default();
    if let Some(message) = extract_api_error(&body) {
        return Err(MuxllmError::Api(message));
    }
    Err(MuxllmError::Http {
        status: status.as_u16(),
        message: reason,
    })
}

/// Pull `error.message` out of an OpenAI-style error body, if present.
fn extract_api_error(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let message = json.get("error")?.get("message")?.as_str()?;
    Some(message.to_string())
}
