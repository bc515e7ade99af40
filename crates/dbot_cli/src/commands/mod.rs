//! CLI command definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dbot_chat::{ChatConfig, KnowledgeBase};

pub mod ask;
pub mod chat;
pub mod history;
pub mod kb;

/// DisasterBot - emergency preparedness assistant
#[derive(Parser)]
#[command(name = "disasterbot")]
#[command(version, about = "DisasterBot - emergency preparedness assistant")]
#[command(long_about = r#"
DisasterBot answers disaster-preparedness questions from a small built-in
knowledge base: safety steps, FAQ answers, emergency contacts and tips.

COMMANDS:
  chat     → Interactive session (type EMERGENCY for immediate help)
  ask      → Resolve a single message and print the reply
  kb       → Print the active knowledge base
  history  → Show or clear the persisted chat history

CONFIGURATION (lowest to highest precedence):
  defaults → --config FILE (TOML) → DBOT_* environment → command-line flags

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Knowledge base error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge base file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// Directory for the persisted chat history
    #[arg(long, global = true)]
    pub history_dir: Option<PathBuf>,

    /// Seed for reproducible tips and typing delays
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Reply without the simulated typing delay
    #[arg(long, global = true)]
    pub no_delay: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session
    Chat(chat::ChatArgs),

    /// Resolve one message and print the reply
    Ask(ask::AskArgs),

    /// Print the active knowledge base
    Kb(kb::KbArgs),

    /// Show or clear the chat history
    History(history::HistoryArgs),
}

impl Cli {
    /// Resolve the effective configuration
    pub fn chat_config(&self) -> Result<ChatConfig> {
        let mut config = match &self.config {
            Some(path) => ChatConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => ChatConfig::default(),
        }
        .with_env_overrides();

        if let Some(path) = &self.knowledge {
            config.knowledge_path = Some(path.clone());
        }
        if let Some(dir) = &self.history_dir {
            config.history_dir = Some(dir.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_delay {
            config = config.with_typing_delay(0, 0);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Load the knowledge base named by the configuration, or the built-in one
    pub fn knowledge_base(&self, config: &ChatConfig) -> Result<KnowledgeBase> {
        match &config.knowledge_path {
            Some(path) => KnowledgeBase::from_file(path)
                .with_context(|| format!("Failed to load knowledge base from {:?}", path)),
            None => Ok(KnowledgeBase::default()),
        }
    }
}
