//! Chat command - Interactive DisasterBot session.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use dbot_chat::{ChatConfig, MessagePipeline};

use super::Cli;
use crate::terminal::TerminalSurface;

const BANNER: &str =
    "DisasterBot - type a question, /topics for what I know, /clear to start over, /quit to leave.";

#[derive(Args)]
pub struct ChatArgs {
    /// Keep history in memory only, ignoring any history directory
    #[arg(long)]
    ephemeral: bool,
}

/// Effective configuration for an interactive session
fn session_config(cli: &Cli, args: &ChatArgs) -> Result<ChatConfig> {
    let mut config = cli.chat_config()?;
    if args.ephemeral {
        config.history_dir = None;
    }
    Ok(config)
}

pub async fn execute(cli: &Cli, args: &ChatArgs) -> Result<()> {
    let config = session_config(cli, args)?;
    if let Some(dir) = &config.history_dir {
        info!("Using chat history at {:?}", dir);
    }

    let pipeline = MessagePipeline::from_config(&config).context("Failed to start chat session")?;

    println!("{}", BANNER);
    println!();
    pipeline.attach_surface(Arc::new(TerminalSurface));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                pipeline.clear_session()?;
                continue;
            }
            "/state" => {
                println!("{}\n", serde_json::to_string(&pipeline.state())?);
                continue;
            }
            "/topics" => {
                println!("{}\n", pipeline.knowledge().categories().join(", "));
                continue;
            }
            command if command.starts_with("/seed") => {
                match command["/seed".len()..].trim().parse::<u64>() {
                    Ok(seed) => {
                        pipeline.reseed(seed);
                        println!("Tips reseeded with {}\n", seed);
                    }
                    Err(_) => println!("Usage: /seed <number>\n"),
                }
                continue;
            }
            _ => {}
        }

        if let Some(reply) = pipeline.submit(&line)? {
            reply.wait().await?;
        }
    }

    pipeline.shutdown().await?;
    println!("Stay safe! 👋");

    Ok(())
}
