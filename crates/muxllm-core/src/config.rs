//! Configuration from the environment
//!
//! The tmux plugin side launches `muxllm` inside a display-popup and passes
//! everything it needs through environment variables. All of them are read
//! once, before the stream starts, into plain immutable values; nothing else
//! in the crate touches the environment.

use std::str::FromStr;

use crate::error::MuxllmError;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TERMINAL_COLUMNS: usize = 120;
pub const DEFAULT_POPUP_WIDTH: PopupWidth = PopupWidth::Percent(90);

/// Columns reserved for popup borders and padding.
pub const MARGIN_RESERVE: usize = 4;
/// Floor for the wrap width so tiny popups stay readable.
pub const MIN_FOLD_WIDTH: usize = 40;

pub const ENV_API_ENDPOINT: &str = "MUXLLM_API_ENDPOINT";
pub const ENV_MODEL: &str = "MUXLLM_MODEL";
pub const ENV_API_KEY: &str = "MUXLLM_API_KEY";
pub const ENV_POPUP_WIDTH: &str = "MUXLLM_POPUP_WIDTH";
pub const ENV_TERMINAL_COLUMNS: &str = "COLUMNS";

/// Endpoint, model, and credential for the chat-completions API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

impl ApiConfig {
    /// Read the API configuration from the environment. An unset or empty
    /// `MUXLLM_API_KEY` is a fatal precondition failure.
    pub fn from_env() -> Result<Self, MuxllmError> {
        Self::from_parts(
            env_nonempty(ENV_API_ENDPOINT),
            env_nonempty(ENV_MODEL),
            env_nonempty(ENV_API_KEY),
        )
    }

    /// Build the configuration from already-looked-up values, applying
    /// defaults for everything except the credential.
    pub fn from_parts(
        endpoint: Option<String>,
        model: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, MuxllmError> {
        let api_key = api_key.ok_or(MuxllmError::MissingApiKey)?;
        Ok(Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
        })
    }
}

/// Popup width as the plugin configures it: absolute columns or a percentage
/// of the surrounding terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupWidth {
    Columns(usize),
    Percent(u8),
}

impl FromStr for PopupWidth {
    type Err = MuxllmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(percent) = s.strip_suffix('%') {
            let percent: u8 = percent
                .parse()
                .map_err(|_| MuxllmError::InvalidPopupWidth(s.to_string()))?;
            return Ok(PopupWidth::Percent(percent));
        }
        let columns: usize = s
            .parse()
            .map_err(|_| MuxllmError::InvalidPopupWidth(s.to_string()))?;
        Ok(PopupWidth::Columns(columns))
    }
}

/// Display geometry the popup was launched with, resolved once per run.
#[derive(Debug, Clone, Copy)]
pub struct PopupGeometry {
    pub terminal_columns: usize,
    pub popup_width: PopupWidth,
}

impl PopupGeometry {
    /// Read `COLUMNS` and `MUXLLM_POPUP_WIDTH` from the environment.
    pub fn from_env() -> Result<Self, MuxllmError> {
        Self::from_parts(
            env_nonempty(ENV_TERMINAL_COLUMNS),
            env_nonempty(ENV_POPUP_WIDTH),
        )
    }

    pub fn from_parts(
        terminal_columns: Option<String>,
        popup_width: Option<String>,
    ) -> Result<Self, MuxllmError> {
        let terminal_columns = match terminal_columns {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| MuxllmError::InvalidTerminalWidth(raw))?,
            None => DEFAULT_TERMINAL_COLUMNS,
        };
        let popup_width = match popup_width {
            Some(raw) => raw.parse()?,
            None => DEFAULT_POPUP_WIDTH,
        };
        Ok(Self {
            terminal_columns,
            popup_width,
        })
    }

    /// Interior wrap width: the popup width minus the margin reserve, never
    /// below the minimum.
    pub fn fold_width(&self) -> usize {
        let popup_columns = match self.popup_width {
            PopupWidth::Percent(percent) => self.terminal_columns * percent as usize / 100,
            PopupWidth::Columns(columns) => columns,
        };
        popup_columns.saturating_sub(MARGIN_RESERVE).max(MIN_FOLD_WIDTH)
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
