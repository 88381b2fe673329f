use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{api_path, emit_json};
use crate::api::{Body, Query};
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct OrgArgs {
    #[command(subcommand)]
    pub command: OrgCommands,
}

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// Get organization details
    Get,
    /// Update organization
    Update {
        /// Organization name
        #[arg(long)]
        name: Option<String>,
        /// Organization settings as a JSON object
        #[arg(long)]
        settings: Option<String>,
    },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Org {
    id: String,
    name: String,
    settings: Map<String, Value>,
}

/// Parse `--settings`, which must be a JSON object.
fn parse_settings(raw: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(raw).context("Invalid settings JSON")
}

pub fn execute(args: OrgArgs, ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    match args.command {
        OrgCommands::Get => {
            let env = client
                .get(&api_path("/org"), &Query::new())
                .context("Failed to get organization")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let org: Org = env.data_as().context("Failed to parse response")?;
            ctx.printer.line(&format!("ID: {}", org.id));
            ctx.printer.line(&format!("Name: {}", org.name));
            if org.settings.is_empty() {
                ctx.printer.line("Settings: (empty)");
            } else {
                ctx.printer
                    .line(&format!("Settings: {}", Value::Object(org.settings)));
            }
        }
        OrgCommands::Update { name, settings } => {
            let mut body = Body::new();
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                body.insert("name".into(), Value::String(name));
            }
            if let Some(raw) = settings.filter(|s| !s.is_empty()) {
                body.insert("settings".into(), Value::Object(parse_settings(&raw)?));
            }
            if body.is_empty() {
                bail!("At least one of --name or --settings must be provided");
            }

            let env = client
                .patch(&api_path("/org"), &body)
                .context("Failed to update organization")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let org: Org = env.data_as().context("Failed to parse response")?;
            ctx.printer
                .success(&format!("Organization updated: {} ({})", org.name, org.id));
        }
    }
    Ok(())
}
