use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;

use super::{api_path, emit_json, note_more, query_of};
use crate::api::Query;
use crate::cli::CommandContext;
use crate::ui::{plural, truncate};

#[derive(Args, Debug)]
pub struct NotificationArgs {
    #[command(subcommand)]
    pub command: NotificationCommands,
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommands {
    /// List notifications
    List {
        /// Filter by notification type
        #[arg(long = "type")]
        kind: Option<String>,
        /// Filter by read status (true/false)
        #[arg(long)]
        read: Option<String>,
        /// Show longer content
        #[arg(long)]
        verbose: bool,
    },
    /// Show unread notification count
    Unread,
    /// Mark notification as read
    Read { id: String },
    /// Mark all notifications as read
    ReadAll,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Notification {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    read: bool,
    title: Option<String>,
    body: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct UnreadCount {
    count: u64,
}

pub fn execute(args: NotificationArgs, ctx: &CommandContext) -> Result<()> {
    let client = ctx.client()?;
    match args.command {
        NotificationCommands::List {
            kind,
            read,
            verbose,
        } => {
            let query = query_of([("type", kind), ("read", read)]);
            let env = client
                .get(&api_path("/notifications"), &query)
                .context("Failed to list notifications")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let notifications: Vec<Notification> =
                env.data_as().context("Failed to parse response")?;
            if notifications.is_empty() {
                ctx.printer.line("No notifications found.");
                return Ok(());
            }

            let max = if verbose { 200 } else { 50 };
            let rows: Vec<Vec<String>> = notifications
                .iter()
                .map(|n| {
                    let mark = if n.read { "✓" } else { " " };
                    let text = n
                        .title
                        .as_deref()
                        .filter(|t| !t.is_empty())
                        .or(n.body.as_deref())
                        .unwrap_or_default();
                    vec![
                        n.id.chars().take(8).collect(),
                        n.kind.clone(),
                        mark.to_string(),
                        truncate(text, max),
                    ]
                })
                .collect();
            ctx.printer.rows(&rows);
            note_more(ctx, &env, notifications.len(), "notifications");
        }
        NotificationCommands::Unread => {
            let env = client
                .get(&api_path("/notifications/unread-count"), &Query::new())
                .context("Failed to get unread count")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let result: UnreadCount = env.data_as().context("Failed to parse response")?;
            if result.count == 0 {
                ctx.printer.line("No unread notifications.");
            } else {
                ctx.printer.line(&format!(
                    "You have {} unread notification{}.",
                    result.count,
                    plural(result.count)
                ));
            }
        }
        NotificationCommands::Read { id } => {
            client
                .patch_empty(&api_path(&format!("/notifications/{id}/read")))
                .context("Failed to mark notification as read")?;
            ctx.printer
                .success(&format!("Notification {id} marked as read"));
        }
        NotificationCommands::ReadAll => {
            client
                .post_empty(&api_path("/notifications/read-all"))
                .context("Failed to mark all as read")?;
            ctx.printer.success("All notifications marked as read");
        }
    }
    Ok(())
}
