use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::json;

use super::{api_path, emit_json};
use crate::api::Query;
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct DmArgs {
    #[command(subcommand)]
    pub command: DmCommands,
}

#[derive(Subcommand, Debug)]
pub enum DmCommands {
    /// List DM conversations
    List,
    /// Start DM conversation
    Start {
        member_id: String,
        /// Member type (user or agent)
        #[arg(long)]
        member_type: String,
    },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Conversation {
    id: String,
    name: String,
    member_id: Option<String>,
    member_type: Option<String>,
}

pub fn execute(args: DmArgs, ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    match args.command {
        DmCommands::List => {
            let env = client
                .get(&api_path("/dm"), &Query::new())
                .context("Failed to list DMs")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let dms: Vec<Conversation> = env.data_as().context("Failed to parse response")?;
            let rows: Vec<Vec<String>> = dms
                .into_iter()
                .map(|d| {
                    vec![
                        d.id,
                        d.name,
                        d.member_id.unwrap_or_default(),
                        d.member_type.unwrap_or_default(),
                    ]
                })
                .collect();
            ctx.printer.rows(&rows);
        }
        DmCommands::Start {
            member_id,
            member_type,
        } => {
            let env = client
                .post(
                    &api_path("/dm"),
                    &json!({ "member_id": member_id, "member_type": member_type }),
                )
                .context("Failed to start DM")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let dm: Conversation = env.data_as().context("Failed to parse response")?;
            ctx.printer
                .success(&format!("DM started: {} ({})", dm.name, dm.id));
        }
    }
    Ok(())
}
