//! Chat configuration.
//!
//! Resolved from defaults, an optional TOML file and `DBOT_*` environment
//! variables, in that order:
//!
//! ```toml
//! typing_delay_min_ms = 800
//! typing_delay_max_ms = 1500
//! seed = 42
//! knowledge_path = "knowledge.yaml"
//! history_dir = ".disasterbot"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, ChatResult};

pub const DEFAULT_TYPING_MIN_MS: u64 = 800;
pub const DEFAULT_TYPING_MAX_MS: u64 = 1500;

/// Configuration for a chat session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChatConfig {
    /// Lower bound of the simulated typing delay
    pub typing_delay_min_ms: u64,
    /// Upper bound of the simulated typing delay (inclusive)
    pub typing_delay_max_ms: u64,
    /// Seed for tip selection and typing delays
    pub seed: Option<u64>,
    /// Knowledge base file replacing the built-in one
    pub knowledge_path: Option<PathBuf>,
    /// Directory for the persisted history; in-memory when unset
    pub history_dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_delay_min_ms: DEFAULT_TYPING_MIN_MS,
            typing_delay_max_ms: DEFAULT_TYPING_MAX_MS,
            seed: None,
            knowledge_path: None,
            history_dir: None,
        }
    }
}

impl ChatConfig {
    /// Read a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ChatResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ChatResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DBOT_*` environment variables; unparsable values are ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("DBOT_TYPING_MIN_MS") {
            if let Ok(ms) = value.parse::<u64>() {
                self.typing_delay_min_ms = ms;
            }
        }

        if let Ok(value) = std::env::var("DBOT_TYPING_MAX_MS") {
            if let Ok(ms) = value.parse::<u64>() {
                self.typing_delay_max_ms = ms;
            }
        }

        if let Ok(value) = std::env::var("DBOT_SEED") {
            if let Ok(seed) = value.parse::<u64>() {
                self.seed = Some(seed);
            }
        }

        if let Ok(path) = std::env::var("DBOT_KNOWLEDGE") {
            if !path.is_empty() {
                self.knowledge_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(dir) = std::env::var("DBOT_HISTORY_DIR") {
            if !dir.is_empty() {
                self.history_dir = Some(PathBuf::from(dir));
            }
        }

        self
    }

    /// Zero-delay configuration, for tests and scripted use
    pub fn instant() -> Self {
        Self {
            typing_delay_min_ms: 0,
            typing_delay_max_ms: 0,
            ..Self::default()
        }
    }

    pub fn with_typing_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.typing_delay_min_ms = min_ms;
        self.typing_delay_max_ms = max_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> ChatResult<()> {
        if self.typing_delay_min_ms > self.typing_delay_max_ms {
            return Err(ChatError::InvalidConfig(format!(
                "typing_delay_min_ms ({}) exceeds typing_delay_max_ms ({})",
                self.typing_delay_min_ms, self.typing_delay_max_ms
            )));
        }
        Ok(())
    }

    pub fn typing_delay_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.typing_delay_min_ms),
            Duration::from_millis(self.typing_delay_max_ms),
        )
    }
}
