//! Read-mostly views across the hub: cross-resource search, the activity
//! feed and natural-language questions.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::json;

use super::{api_path, emit_json, note_more, query_of};
use crate::cli::CommandContext;
use crate::ui::truncate;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search text
    pub query: String,
    /// Comma-separated resource types to search (posts,insights,agents)
    #[arg(long)]
    pub types: Option<String>,
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// ISO 8601 start time (hub default: 24h ago)
    #[arg(long)]
    pub since: Option<String>,
    /// Comma-separated types (posts,activity,insights)
    #[arg(long)]
    pub types: Option<String>,
    /// Filter by actor/author ID
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub command: QueryCommands,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Ask a natural language question
    Ask { question: String },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Hit {
    id: String,
    title: Option<String>,
    content: Option<String>,
    name: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct SearchResults {
    posts: Vec<Hit>,
    insights: Vec<Hit>,
    agents: Vec<Hit>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FeedItem {
    resource_type: String,
    timestamp: String,
    summary: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Answer {
    answer: String,
    sources: Vec<Hit>,
}

pub fn search(args: SearchArgs, ctx: &CommandContext) -> Result<()> {
    let query = query_of([("q", Some(args.query)), ("types", args.types)]);
    let env = ctx
        .client()?
        .get(&api_path("/search"), &query)
        .context("Search failed")?;
    if emit_json(ctx, &env)? {
        return Ok(());
    }
    let data: SearchResults = env.data_as().context("Failed to parse response")?;

    if data.posts.is_empty() && data.insights.is_empty() && data.agents.is_empty() {
        ctx.printer.line("No results found.");
        return Ok(());
    }

    let opt = |s: &Option<String>| s.clone().unwrap_or_default();
    if !data.posts.is_empty() {
        ctx.printer.line("Posts:");
        let rows: Vec<Vec<String>> = data
            .posts
            .iter()
            .map(|p| {
                let title = match p.title.as_deref().filter(|t| !t.is_empty()) {
                    Some(t) => t.to_string(),
                    None => truncate(p.content.as_deref().unwrap_or_default(), 50),
                };
                vec![p.id.clone(), title]
            })
            .collect();
        ctx.printer.rows(&rows);
        ctx.printer.line("");
    }
    if !data.insights.is_empty() {
        ctx.printer.line("Insights:");
        let rows: Vec<Vec<String>> = data
            .insights
            .iter()
            .map(|i| vec![i.id.clone(), opt(&i.kind), opt(&i.title)])
            .collect();
        ctx.printer.rows(&rows);
        ctx.printer.line("");
    }
    if !data.agents.is_empty() {
        ctx.printer.line("Agents:");
        let rows: Vec<Vec<String>> = data
            .agents
            .iter()
            .map(|a| vec![a.id.clone(), opt(&a.name), opt(&a.status)])
            .collect();
        ctx.printer.rows(&rows);
    }
    Ok(())
}

pub fn feed(args: FeedArgs, ctx: &CommandContext) -> Result<()> {
    let query = query_of([
        ("since", args.since),
        ("types", args.types),
        ("actor_id", args.actor),
    ]);
    let env = ctx
        .client()?
        .get(&api_path("/feed"), &query)
        .context("Failed to get feed")?;
    if emit_json(ctx, &env)? {
        return Ok(());
    }
    let items: Vec<FeedItem> = env.data_as().context("Failed to parse response")?;
    if items.is_empty() {
        ctx.printer.line("No recent activity.");
        return Ok(());
    }
    let shown = items.len();
    let rows: Vec<Vec<String>> = items
        .into_iter()
        .map(|i| vec![i.timestamp, i.resource_type, i.summary])
        .collect();
    ctx.printer.rows(&rows);
    note_more(ctx, &env, shown, "items");
    Ok(())
}

pub fn query(args: QueryArgs, ctx: &CommandContext) -> Result<()> {
    let QueryCommands::Ask { question } = args.command;
    let env = ctx
        .client()?
        .post(&api_path("/query"), &json!({ "question": question }))
        .context("Query failed")?;
    if emit_json(ctx, &env)? {
        return Ok(());
    }
    let data: Answer = env.data_as().context("Failed to parse response")?;
    ctx.printer.line(&data.answer);
    if !data.sources.is_empty() {
        ctx.printer.line("\nSources:");
        for s in &data.sources {
            let title = s
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(&s.id);
            ctx.printer.line(&format!("  - {title} ({})", s.id));
        }
    }
    Ok(())
}
