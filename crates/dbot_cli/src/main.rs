//! DisasterBot CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Knowledge base error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod terminal;

use commands::{Cli, Commands};

/// Script-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const KNOWLEDGE_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps logs out of the conversation
    let default_directive = if cli.verbose { "dbot=debug" } else { "dbot=info" };
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match &cli.command {
        Commands::Chat(args) => commands::chat::execute(&cli, args).await,
        Commands::Ask(args) => commands::ask::execute(&cli, args).await,
        Commands::Kb(args) => commands::kb::execute(&cli, args).await,
        Commands::History(args) => commands::history::execute(&cli, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(chat_error) = e.downcast_ref::<dbot_chat::ChatError>() {
        return match chat_error {
            dbot_chat::ChatError::InvalidConfig(_) | dbot_chat::ChatError::Toml(_) => {
                ExitCodes::CONFIG_ERROR
            }
            dbot_chat::ChatError::InvalidKnowledgeBase(_)
            | dbot_chat::ChatError::UnsupportedFormat(_)
            | dbot_chat::ChatError::Yaml(_) => ExitCodes::KNOWLEDGE_ERROR,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("config") {
        ExitCodes::CONFIG_ERROR
    } else if msg.contains("knowledge") {
        ExitCodes::KNOWLEDGE_ERROR
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
