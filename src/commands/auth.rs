//! Identity commands: login, agent registration, invite redemption, and
//! the local views of the stored credentials.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::api_path;
use crate::api::HubClient;
use crate::cli::CommandContext;
use crate::config::{Config, DEFAULT_HUB_URL};
use crate::ui::prompt_password;

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Login as a human user
    Login {
        /// Email address
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Hub URL
        #[arg(long, default_value = DEFAULT_HUB_URL)]
        hub_url: String,
    },
    /// Register this machine as an agent
    LoginAgent {
        /// Agent name
        #[arg(long)]
        name: String,
        /// Agent description
        #[arg(long, default_value = "")]
        description: String,
        /// Hub URL
        #[arg(long, default_value = DEFAULT_HUB_URL)]
        hub_url: String,
        /// One-time registration token
        #[arg(long)]
        token: String,
    },
    /// Show current identity
    Whoami,
    /// Clear stored credentials
    Logout,
    /// Export connection info for pocket-agent
    Export,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Invite URL (https://hub.example.com/invite/AHQ-xxxxx-xxxx) or bare token
    pub invite: String,
    /// Hub URL (only needed with bare tokens)
    #[arg(long)]
    pub hub_url: Option<String>,
    /// Agent name (default: hostname-based)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct LoginUser {
    id: String,
    email: String,
    name: String,
    org_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoginData {
    user: LoginUser,
    access_token: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RegisteredAgent {
    id: String,
    name: String,
    org_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct RegisterData {
    agent: RegisteredAgent,
    api_key: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct RedeemData {
    agent: RegisteredAgent,
    api_key: String,
    org_id: Option<String>,
}

pub fn execute(args: AuthArgs, ctx: &CommandContext) -> Result<()> {
    match args.command {
        AuthCommands::Login {
            email,
            password,
            hub_url,
        } => login(ctx, email, password, hub_url),
        AuthCommands::LoginAgent {
            name,
            description,
            hub_url,
            token,
        } => login_agent(ctx, name, description, hub_url, token),
        AuthCommands::Whoami => whoami(ctx),
        AuthCommands::Logout => {
            ctx.save_config(&Config::cleared())
                .context("Failed to clear config")?;
            ctx.printer.success("Logged out");
            Ok(())
        }
        AuthCommands::Export => export(ctx),
    }
}

fn login(
    ctx: &CommandContext,
    email: String,
    password: Option<String>,
    hub_url: String,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password")?,
    };

    // no stored identity is consulted for login
    let client = HubClient::with_token(hub_url.clone(), "")?;
    let spinner = ctx.printer.spinner("Logging in...");
    let res = client.post(
        &api_path("/auth/login"),
        &json!({ "email": email, "password": password }),
    );
    spinner.finish_and_clear();
    let env = res.context("Login failed")?;
    let data: LoginData = env.data_as().context("Login failed")?;

    let cfg = Config {
        hub_url,
        jwt_token: Some(data.access_token),
        org_id: data.user.org_id,
        ..Config::default()
    };
    ctx.save_config(&cfg)?;
    tracing::debug!(user_id = %data.user.id, "session stored");

    ctx.printer
        .success(&format!("Logged in as {} ({})", data.user.name, data.user.email));
    Ok(())
}

fn login_agent(
    ctx: &CommandContext,
    name: String,
    description: String,
    hub_url: String,
    token: String,
) -> Result<()> {
    let client = HubClient::with_token(hub_url.clone(), token)?;
    let spinner = ctx.printer.spinner("Registering agent...");
    let res = client.post(
        &api_path("/auth/agents/register"),
        &json!({ "name": name, "description": description }),
    );
    spinner.finish_and_clear();
    let env = res.context("Agent registration failed")?;
    let data: RegisterData = env.data_as().context("Agent registration failed")?;

    let cfg = Config {
        hub_url,
        api_key: Some(data.api_key),
        org_id: data.agent.org_id,
        agent_id: Some(data.agent.id.clone()),
        ..Config::default()
    };
    ctx.save_config(&cfg)?;

    ctx.printer
        .success(&format!("Agent registered: {} (ID: {})", name, data.agent.id));
    ctx.printer.note("API Key saved to config. Keep it safe!");
    Ok(())
}

fn whoami(ctx: &CommandContext) -> Result<()> {
    let cfg = ctx.load_config().context("Not logged in")?;
    let org = cfg.org_id.as_deref().unwrap_or_default();
    if cfg.is_agent() {
        ctx.printer.success(&format!(
            "Agent ID: {}, Org: {}, Hub: {}",
            cfg.agent_id.as_deref().unwrap_or_default(),
            org,
            cfg.hub_url
        ));
    } else if cfg.auth_token().is_some() {
        ctx.printer
            .success(&format!("User, Org: {}, Hub: {}", org, cfg.hub_url));
    } else {
        bail!("Not logged in");
    }
    Ok(())
}

fn export(ctx: &CommandContext) -> Result<()> {
    let cfg = ctx.load_config().context("Not logged in")?;
    let Some(api_key) = cfg.api_key.as_deref().filter(|k| !k.is_empty()) else {
        bail!("No agent credentials found. Please run 'agenthq auth login-agent' first.");
    };
    let agent_id = cfg.agent_id.as_deref().unwrap_or_default();
    let org_id = cfg.org_id.as_deref().unwrap_or_default();

    let export = json!({
        "hub_url": cfg.hub_url,
        "api_key": api_key,
        "agent_id": agent_id,
        "org_id": org_id,
    });
    if ctx.printer.is_json() {
        return ctx.printer.json(&export);
    }

    ctx.printer.line("AgentHQ Connection Info:");
    ctx.printer.line(&format!("  HUB_URL={}", cfg.hub_url));
    ctx.printer.line(&format!("  AGENTHQ_API_KEY={api_key}"));
    ctx.printer.line(&format!("  AGENTHQ_AGENT_ID={agent_id}"));
    ctx.printer.line(&format!("  AGENTHQ_ORG_ID={org_id}"));
    ctx.printer.line("\nJSON format:");
    ctx.printer.json(&export)
}

/// Split an invite argument into hub URL and token. Full invite URLs carry
/// their own hub; bare tokens fall back to `fallback_hub`.
pub fn parse_invite(arg: &str, fallback_hub: Option<&str>) -> Result<(Option<String>, String)> {
    let arg = arg.trim();
    let re = Regex::new(r"^(https?://.+?)/invite/(AHQ-[A-Za-z0-9]+-[A-Za-z0-9]+)/?$")?;
    if let Some(caps) = re.captures(arg) {
        return Ok((Some(caps[1].to_string()), caps[2].to_string()));
    }
    Ok((fallback_hub.map(str::to_string), arg.to_string()))
}

fn default_agent_name() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
        })
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "agent".to_string());
    format!("Agent - {host}")
}

pub fn connect(args: ConnectArgs, ctx: &CommandContext) -> Result<()> {
    let (hub, token) = parse_invite(&args.invite, args.hub_url.as_deref())?;
    let hub_url = hub
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HUB_URL.to_string());
    let name = args.name.unwrap_or_else(default_agent_name);

    // redeeming an invite needs no credential
    let client = HubClient::with_token(hub_url.clone(), "")?;
    let spinner = ctx.printer.spinner("Redeeming invite...");
    let res = client.post(
        &api_path("/auth/invites/redeem"),
        &json!({ "token": token, "agentName": name }),
    );
    spinner.finish_and_clear();
    let env = res.context("Failed to redeem invite")?;
    let data: RedeemData = env.data_as().context("Failed to parse response")?;

    let cfg = Config {
        hub_url,
        api_key: Some(data.api_key),
        org_id: data.org_id,
        agent_id: Some(data.agent.id.clone()),
        ..Config::default()
    };
    ctx.save_config(&cfg)?;

    ctx.printer.success(&format!(
        "Connected as {} (ID: {})",
        data.agent.name, data.agent.id
    ));
    ctx.printer.note("Credentials saved to config. You're ready to go!");
    Ok(())
}
