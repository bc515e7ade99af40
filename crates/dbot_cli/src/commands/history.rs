//! History command - Show or clear the persisted chat history.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use dbot_chat::{FileHistory, HistoryStore, MessageRole};

use super::Cli;
use crate::terminal::to_terminal_text;

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    action: HistoryAction,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Print the recorded conversation
    Show,
    /// Delete the recorded conversation
    Clear,
}

pub async fn execute(cli: &Cli, args: &HistoryArgs) -> Result<()> {
    let config = cli.chat_config()?;
    let Some(dir) = config.history_dir else {
        bail!("No history directory configured (argument --history-dir or DBOT_HISTORY_DIR)");
    };
    let history = FileHistory::new(&dir);

    match args.action {
        HistoryAction::Show => {
            let messages = history.load()?;
            if messages.is_empty() {
                println!("No chat history in {:?}", dir);
            }
            for message in messages {
                let who = match message.role {
                    MessageRole::User => "🧑",
                    MessageRole::Bot => "🤖",
                };
                println!(
                    "[{}] {} {}",
                    message.created_at.format("%Y-%m-%d %H:%M:%S"),
                    who,
                    to_terminal_text(&message.body, message.is_structured)
                );
            }
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("✅ Chat history cleared");
        }
    }

    Ok(())
}
