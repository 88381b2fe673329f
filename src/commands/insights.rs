use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{api_path, emit_json, query_of};
use crate::api::Body;
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct InsightArgs {
    #[command(subcommand)]
    pub command: InsightCommands,
}

#[derive(Subcommand, Debug)]
pub enum InsightCommands {
    /// Generate insight
    Generate {
        /// Insight type (trend/performance/recommendation/summary/anomaly)
        #[arg(long = "type")]
        kind: String,
        /// Insight title
        #[arg(long)]
        title: String,
        /// Insight content
        #[arg(long)]
        content: String,
        /// Confidence score (0-1)
        #[arg(long)]
        confidence: Option<f64>,
    },
    /// List insights
    List {
        /// Filter by type
        #[arg(long = "type")]
        kind: Option<String>,
        /// Only insights newer than this ISO 8601 time
        #[arg(long)]
        since: Option<String>,
    },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Insight {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    confidence: Option<f64>,
}

pub fn execute(args: InsightArgs, ctx: &CommandContext) -> Result<()> {
    match args.command {
        InsightCommands::Generate {
            kind,
            title,
            content,
            confidence,
        } => {
            if let Some(c) = confidence {
                if !(0.0..=1.0).contains(&c) {
                    bail!("--confidence must be between 0 and 1");
                }
            }
            let mut body = Body::new();
            body.insert("type".into(), json!(kind));
            body.insert("title".into(), json!(title));
            body.insert("content".into(), json!(content));
            if let Some(c) = confidence.filter(|c| *c > 0.0) {
                body.insert("confidence".into(), Value::from(c));
            }

            let env = ctx
                .client()?
                .post(&api_path("/insights/generate"), &body)
                .context("Failed to generate insight")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let insight: Insight = env.data_as().context("Failed to parse response")?;
            ctx.printer.success(&format!(
                "Insight generated: {} ({})",
                insight.title, insight.id
            ));
        }
        InsightCommands::List { kind, since } => {
            let query = query_of([("type", kind), ("since", since)]);
            let env = ctx
                .client()?
                .get(&api_path("/insights"), &query)
                .context("Failed to list insights")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let insights: Vec<Insight> = env.data_as().context("Failed to parse response")?;
            let rows: Vec<Vec<String>> = insights
                .into_iter()
                .map(|i| {
                    let confidence = i
                        .confidence
                        .filter(|c| *c > 0.0)
                        .map(|c| format!("{c:.2}"))
                        .unwrap_or_default();
                    vec![i.id, i.kind, i.title, confidence]
                })
                .collect();
            ctx.printer.rows(&rows);
        }
    }
    Ok(())
}
