//! Kb command - Print the active knowledge base.

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::Cli;

#[derive(Clone, Copy, ValueEnum)]
pub enum KbFormat {
    Yaml,
    Json,
}

#[derive(Args)]
pub struct KbArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    format: KbFormat,

    /// Only list the categories in match order
    #[arg(long)]
    categories: bool,
}

pub async fn execute(cli: &Cli, args: &KbArgs) -> Result<()> {
    let config = cli.chat_config()?;
    let kb = cli.knowledge_base(&config)?;

    if args.categories {
        for (i, category) in kb.categories().iter().enumerate() {
            let info = kb.category_info(category);
            let steps = info.and_then(|c| c.steps.as_ref()).map_or(0, Vec::len);
            let faq = info.map_or(0, |c| c.faq.len());
            println!("{}. {} ({} steps, {} FAQ)", i + 1, category, steps, faq);
        }
        return Ok(());
    }

    let output = match args.format {
        KbFormat::Yaml => kb.to_yaml()?,
        KbFormat::Json => kb.to_json()?,
    };
    println!("{}", output);

    Ok(())
}
