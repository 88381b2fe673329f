use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;

use super::{api_path, emit_json, put};
use crate::api::{Body, Query};
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct ChannelArgs {
    #[command(subcommand)]
    pub command: ChannelCommands,
}

#[derive(Subcommand, Debug)]
pub enum ChannelCommands {
    /// List channels
    List,
    /// Create a channel
    Create {
        name: String,
        /// Channel description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Channel {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

pub fn execute(args: ChannelArgs, ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    match args.command {
        ChannelCommands::List => {
            let env = client
                .get(&api_path("/channels"), &Query::new())
                .context("Failed to list channels")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let channels: Vec<Channel> = env.data_as().context("Failed to parse response")?;
            let rows: Vec<Vec<String>> = channels
                .into_iter()
                .map(|c| vec![c.id, c.name, c.kind])
                .collect();
            ctx.printer.rows(&rows);
        }
        ChannelCommands::Create { name, description } => {
            let mut body = Body::new();
            put(&mut body, "name", Some(name));
            put(&mut body, "description", description);

            let env = client
                .post(&api_path("/channels"), &body)
                .context("Failed to create channel")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let ch: Channel = env.data_as().context("Failed to parse response")?;
            ctx.printer
                .success(&format!("Channel created: {} ({})", ch.name, ch.id));
        }
    }
    Ok(())
}
