use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;

use super::{api_path, emit_json, put, query_of};
use crate::api::Body;
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct ActivityArgs {
    #[command(subcommand)]
    pub command: ActivityCommands,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// Log an activity
    Log {
        /// Action name (e.g. 'listing.viewed')
        #[arg(long)]
        action: String,
        /// Resource type
        #[arg(long)]
        resource_type: Option<String>,
        /// Resource ID
        #[arg(long)]
        resource_id: Option<String>,
    },
    /// List activity log entries
    List {
        /// Filter by actor ID
        #[arg(long)]
        actor: Option<String>,
        /// Filter by action
        #[arg(long)]
        action: Option<String>,
    },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Entry {
    id: String,
    actor_id: String,
    action: String,
    created_at: String,
}

pub fn execute(args: ActivityArgs, ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    match args.command {
        ActivityCommands::Log {
            action,
            resource_type,
            resource_id,
        } => {
            let mut body = Body::new();
            put(&mut body, "action", Some(action));
            put(&mut body, "resource_type", resource_type);
            put(&mut body, "resource_id", resource_id);

            client
                .post(&api_path("/activity"), &body)
                .context("Failed to log activity")?;
            ctx.printer.success("Activity logged");
        }
        ActivityCommands::List { actor, action } => {
            let query = query_of([("actor_id", actor), ("action", action)]);
            let env = client
                .get(&api_path("/activity"), &query)
                .context("Failed to list activity")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let entries: Vec<Entry> = env.data_as().context("Failed to parse response")?;
            let rows: Vec<Vec<String>> = entries
                .into_iter()
                .map(|e| vec![e.id, e.actor_id, e.action, e.created_at])
                .collect();
            ctx.printer.rows(&rows);
        }
    }
    Ok(())
}
