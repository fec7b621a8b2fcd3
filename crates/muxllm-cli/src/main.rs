//! muxllm: stream an LLM answer into a tmux popup
//!
//! Reads the prompt from stdin, streams the chat completion, and writes
//! word-wrapped lines to stdout as soon as they resolve. Designed to run
//! inside `tmux display-popup`, so stdout carries only popup content and
//! all diagnostics go to stderr.

use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use muxllm_core::{AiClient, ApiConfig, PopupGeometry, StreamEvent, StreamingWrapper};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Stream an LLM response into a tmux popup
#[derive(Parser, Debug)]
#[command(name = "muxllm")]
#[command(about = "Stream an LLM response into a tmux popup", long_about = None)]
#[command(version)]
struct Args {
    /// Model name (overrides MUXLLM_MODEL)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Chat-completions endpoint URL (overrides MUXLLM_API_ENDPOINT)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Popup width in columns or as a percentage, e.g. 120 or 90%
    /// (overrides MUXLLM_POPUP_WIDTH)
    #[arg(long, value_name = "WIDTH")]
    popup_width: Option<String>,

    /// Log filter used when RUST_LOG is unset; logs go to stderr
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let prompt = read_prompt()?;
    let config = resolve_api_config(&args)?;
    let geometry = resolve_geometry(&args)?;

    info!(
        "Starting stream: model={} fold_width={}",
        config.model,
        geometry.fold_width()
    );

    run(AiClient::new(config), &prompt, geometry.fold_width()).await
}

/// The prompt is everything on stdin; an empty prompt is a usage error.
fn read_prompt() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    let prompt = input.trim();
    if prompt.is_empty() {
        bail!("No input text provided");
    }
    Ok(prompt.to_string())
}

fn resolve_api_config(args: &Args) -> Result<ApiConfig> {
    let mut config = ApiConfig::from_env()?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    Ok(config)
}

fn resolve_geometry(args: &Args) -> Result<PopupGeometry> {
    let mut geometry = PopupGeometry::from_env()?;
    if let Some(width) = &args.popup_width {
        geometry.popup_width = width.parse()?;
    }
    Ok(geometry)
}

/// Pull events from the stream and push wrapped lines to stdout.
///
/// Each event is fully processed, wrapped output written and flushed,
/// before the next one is awaited, so the popup fills in as text arrives.
async fn run(client: AiClient, prompt: &str, fold_width: usize) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut events = client.stream_completion(prompt, cancel.clone());

    // Ctrl-C cancels the transfer; buffered content is discarded.
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut wrapper = StreamingWrapper::new(fold_width);
    let mut stdout = std::io::stdout();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                eprintln!("\n\nInterrupted");
                std::process::exit(1);
            }
            event = events.recv() => event,
        };

        match event {
            Some(StreamEvent::TextDelta { delta }) => {
                write_output(&mut stdout, &wrapper.feed(&delta))?;
            }
            Some(StreamEvent::Error { message }) => {
                // Errors render in the popup, wrapped like any other text.
                let rendered = wrapper.feed(&format!("\nError: {message}\n"));
                write_output(&mut stdout, &rendered)?;
            }
            Some(StreamEvent::Done) | None => break,
        }
    }

    debug!("Stream drained, flushing remainder");
    write_output(&mut stdout, &wrapper.flush())?;
    Ok(())
}

fn write_output(stdout: &mut std::io::Stdout, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")
}
