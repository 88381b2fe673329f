use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;

use super::{api_path, emit_json};
use crate::api::Query;
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommands,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List agents in organization
    List,
    /// Show agent online/offline status
    Status,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Agent {
    id: String,
    name: String,
    status: String,
    last_heartbeat: Option<String>,
}

pub fn execute(args: AgentArgs, ctx: &CommandContext) -> Result<()> {
    let (failure, status_view) = match args.command {
        AgentCommands::List => ("Failed to list agents", false),
        AgentCommands::Status => ("Failed to get agent status", true),
    };

    let client = ctx.client()?;
    let env = client.get(&api_path("/agents"), &Query::new()).context(failure)?;
    if emit_json(ctx, &env)? {
        return Ok(());
    }

    let agents: Vec<Agent> = env.data_as().context("Failed to parse response")?;
    let rows: Vec<Vec<String>> = agents
        .into_iter()
        .map(|a| {
            if status_view {
                let hb = a
                    .last_heartbeat
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| "never".to_string());
                vec![a.name, a.status, hb]
            } else {
                vec![a.id, a.name, a.status]
            }
        })
        .collect();
    ctx.printer.rows(&rows);
    Ok(())
}
