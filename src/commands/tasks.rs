//! Task tracking commands.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Deserialize;

use super::{api_path, emit_json, put, query_of};
use crate::api::{Body, Query};
use crate::cli::CommandContext;

#[derive(Args, Debug)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
        /// Filter by priority
        #[arg(long)]
        priority: Option<String>,
        /// Filter by assigned agent
        #[arg(long)]
        assigned_to: Option<String>,
        /// Filter by channel
        #[arg(long)]
        channel: Option<String>,
    },
    /// Create a task
    Create {
        /// Task title
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Get a task by ID
    Get { id: String },
    /// Update a task
    Update {
        id: String,
        /// Task title
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task
    Delete { id: String },
}

/// Optional task attributes shared by create and update.
#[derive(Args, Debug, Default)]
pub struct TaskFields {
    /// Task description
    #[arg(long)]
    pub description: Option<String>,
    /// Task status
    #[arg(long)]
    pub status: Option<String>,
    /// Task priority
    #[arg(long)]
    pub priority: Option<String>,
    /// Assigned agent ID
    #[arg(long)]
    pub assigned_to: Option<String>,
    /// Assignment type
    #[arg(long)]
    pub assigned_type: Option<String>,
    /// Channel ID
    #[arg(long)]
    pub channel: Option<String>,
    /// Due date (ISO 8601)
    #[arg(long)]
    pub due_date: Option<String>,
}

impl TaskFields {
    fn into_body(self, title: Option<String>) -> Body {
        let mut body = Body::new();
        put(&mut body, "title", title);
        put(&mut body, "description", self.description);
        put(&mut body, "status", self.status);
        put(&mut body, "priority", self.priority);
        put(&mut body, "assigned_to", self.assigned_to);
        put(&mut body, "assigned_type", self.assigned_type);
        put(&mut body, "channel", self.channel);
        put(&mut body, "due_date", self.due_date);
        body
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Task {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    assigned_to: Option<String>,
    assigned_type: Option<String>,
    channel_id: Option<String>,
    due_date: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

fn stamp(at: Option<DateTime<Utc>>, format: &str) -> String {
    at.map(|t| t.format(format).to_string())
        .unwrap_or_else(|| "none".to_string())
}

fn task_path(id: &str) -> String {
    api_path(&format!("/tasks/{id}"))
}

pub fn execute(args: TaskArgs, ctx: &CommandContext) -> Result<()> {
    match args.command {
        TaskCommands::List {
            status,
            priority,
            assigned_to,
            channel,
        } => {
            let query = query_of([
                ("status", status),
                ("priority", priority),
                ("assigned_to", assigned_to),
                ("channel", channel),
            ]);
            let env = ctx
                .client()?
                .get(&api_path("/tasks"), &query)
                .context("Failed to list tasks")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let tasks: Vec<Task> = env.data_as().context("Failed to parse response")?;
            if tasks.is_empty() {
                ctx.printer.success("No tasks found");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = tasks
                .into_iter()
                .map(|t| {
                    let due = t
                        .due_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    vec![t.id, t.title, t.status, t.priority, due]
                })
                .collect();
            ctx.printer.rows(&rows);
        }
        TaskCommands::Create { title, fields } => {
            let body = fields.into_body(Some(title));
            let env = ctx
                .client()?
                .post(&api_path("/tasks"), &body)
                .context("Failed to create task")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let task: Task = env.data_as().context("Failed to parse response")?;
            ctx.printer
                .success(&format!("Task created: {} ({})", task.title, task.id));
        }
        TaskCommands::Get { id } => {
            let env = ctx
                .client()?
                .get(&task_path(&id), &Query::new())
                .context("Failed to get task")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let task: Task = env.data_as().context("Failed to parse response")?;
            print_task(ctx, task);
        }
        TaskCommands::Update { id, title, fields } => {
            let body = fields.into_body(title);
            if body.is_empty() {
                bail!("Nothing to update: pass at least one field flag");
            }
            let env = ctx
                .client()?
                .patch(&task_path(&id), &body)
                .context("Failed to update task")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let task: Task = env.data_as().context("Failed to parse response")?;
            ctx.printer
                .success(&format!("Task updated: {} ({})", task.title, task.id));
        }
        TaskCommands::Delete { id } => {
            ctx.client()?
                .delete(&task_path(&id))
                .context("Failed to delete task")?;
            ctx.printer.success(&format!("Task deleted: {id}"));
        }
    }
    Ok(())
}

fn print_task(ctx: &CommandContext, task: Task) {
    const FULL: &str = "%Y-%m-%d %H:%M:%S";
    let fields = [
        ("ID", task.id),
        ("Title", task.title),
        ("Description", task.description.unwrap_or_default()),
        ("Status", task.status),
        ("Priority", task.priority),
        ("Assigned To", task.assigned_to.unwrap_or_default()),
        ("Assigned Type", task.assigned_type.unwrap_or_default()),
        ("Channel ID", task.channel_id.unwrap_or_default()),
        ("Due Date", stamp(task.due_date, FULL)),
        ("Created At", stamp(task.created_at, FULL)),
        ("Completed At", stamp(task.completed_at, FULL)),
    ];
    for (label, value) in fields {
        ctx.printer.line(&format!("{label}: {value}"));
    }
}
