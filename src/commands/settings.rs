//! Local configuration editing and hub connectivity checks.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::{Map, Value};

use crate::api::Query;
use crate::cli::CommandContext;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a config value (hub_url, api_key, org_id, agent_id)
    Set { key: String, value: String },
    /// Show current configuration
    Get,
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(subcommand)]
    pub command: SetupCommands,
}

#[derive(Subcommand, Debug)]
pub enum SetupCommands {
    /// Test hub connectivity
    Test,
}

/// Assign one settable key. Session tokens only come from `auth login`.
fn apply_setting(cfg: &mut Config, key: &str, value: String) -> Result<()> {
    match key {
        "hub_url" => cfg.hub_url = value,
        "api_key" => cfg.api_key = Some(value),
        "org_id" => cfg.org_id = Some(value),
        "agent_id" => cfg.agent_id = Some(value),
        _ => bail!("Unknown config key: {key}"),
    }
    Ok(())
}

/// Config as shown to the user, with secrets masked.
fn masked_view(cfg: &Config) -> Map<String, Value> {
    let mut view = Map::new();
    view.insert("hub_url".into(), Value::String(cfg.hub_url.clone()));
    let plain = [("org_id", &cfg.org_id), ("agent_id", &cfg.agent_id)];
    for (key, value) in plain {
        view.insert(key.into(), Value::String(value.clone().unwrap_or_default()));
    }
    if let Some(key) = cfg.api_key.as_deref().filter(|k| !k.is_empty()) {
        let shown: String = key.chars().take(12).collect();
        view.insert("api_key".into(), Value::String(format!("{shown}...")));
    }
    if cfg.jwt_token.as_deref().is_some_and(|t| !t.is_empty()) {
        view.insert("jwt_token".into(), Value::String("***set***".into()));
    }
    view
}

pub fn config(args: ConfigArgs, ctx: &CommandContext) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    match args.command {
        ConfigCommands::Set { key, value } => {
            apply_setting(&mut cfg, &key, value.clone())?;
            ctx.save_config(&cfg)?;
            ctx.printer.success(&format!("Config {key} set to {value}"));
            Ok(())
        }
        ConfigCommands::Get => ctx.printer.json(&masked_view(&cfg)),
    }
}

pub fn setup(args: SetupArgs, ctx: &CommandContext) -> Result<()> {
    let SetupCommands::Test = args.command;
    let client = ctx.client()?;
    if !ctx.printer.is_json() {
        ctx.printer
            .line(&format!("Testing connection to {}...", client.base_url()));
    }

    let spinner = ctx.printer.spinner("Contacting hub...");
    let res = client.get("/health", &Query::new());
    spinner.finish_and_clear();
    res.context("Connection failed")?;

    ctx.printer.success("Hub is reachable");
    Ok(())
}
