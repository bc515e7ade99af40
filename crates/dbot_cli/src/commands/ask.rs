//! Ask command - Resolve a single message.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use dbot_chat::IntentResolver;

use super::Cli;
use crate::terminal::to_terminal_text;

#[derive(Args)]
pub struct AskArgs {
    /// The message to resolve
    #[arg(required = true)]
    message: Vec<String>,

    /// Print the full response payload as JSON
    #[arg(long)]
    json: bool,

    /// Print the body as HTML (auto-linked when plain text)
    #[arg(long, conflicts_with = "json")]
    html: bool,
}

pub async fn execute(cli: &Cli, args: &AskArgs) -> Result<()> {
    let config = cli.chat_config()?;
    let kb = Arc::new(cli.knowledge_base(&config)?);

    let mut resolver = match config.seed {
        Some(seed) => IntentResolver::with_seed(kb, seed),
        None => IntentResolver::new(kb),
    };

    let payload = resolver.resolve(&args.message.join(" "));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if args.html {
        println!(
            "{}",
            dbot_chat::render_bot_body(&payload.body, payload.is_structured)
        );
    } else {
        println!("{}", to_terminal_text(&payload.body, payload.is_structured));
    }

    Ok(())
}
