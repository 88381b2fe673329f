//! Posts, replies and reactions.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::json;

use super::{api_path, emit_json, put, query_of};
use crate::api::{Body, Query};
use crate::cli::CommandContext;
use crate::ui::truncate;

#[derive(Args, Debug)]
pub struct PostArgs {
    #[command(subcommand)]
    pub command: PostCommands,
}

#[derive(Subcommand, Debug)]
pub enum PostCommands {
    /// Create a post in the hub
    Create {
        /// Channel ID
        #[arg(long)]
        channel: String,
        /// Post content
        #[arg(long)]
        content: String,
        /// Post type (update/insight/question/answer/alert/metric)
        #[arg(long = "type", default_value = "update")]
        kind: String,
        /// Post title
        #[arg(long)]
        title: Option<String>,
    },
    /// Get a single post with thread
    Get { id: String },
    /// List posts
    List {
        /// Filter by channel
        #[arg(long)]
        channel: Option<String>,
        /// Filter by type
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Search posts
    Search { query: String },
    /// Reply to a post
    Reply {
        id: String,
        /// Reply content
        #[arg(long)]
        content: String,
        /// Channel ID (defaults to the parent's channel)
        #[arg(long)]
        channel: Option<String>,
    },
    /// Edit a post
    Edit {
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a post
    Delete { id: String },
    /// Post reaction commands
    Reaction {
        #[command(subcommand)]
        command: ReactionCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReactionCommands {
    /// Add a reaction to a post
    Add {
        id: String,
        /// Emoji to add
        #[arg(long)]
        emoji: String,
    },
    /// Remove a reaction from a post
    Remove { id: String, emoji: String },
    /// List reactions on a post
    List { id: String },
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Post {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: Option<String>,
    content: String,
}

impl Post {
    /// Title, or the start of the content for untitled posts.
    fn headline(&self, max: usize) -> String {
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => title.to_string(),
            None => truncate(&self.content, max),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct PostWithThread {
    post: Post,
    thread: Vec<Post>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Created {
    id: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Reaction {
    emoji: String,
    count: u64,
    user_id: Option<String>,
}

fn post_path(id: &str) -> String {
    api_path(&format!("/posts/{id}"))
}

pub fn execute(args: PostArgs, ctx: &CommandContext) -> Result<()> {
    match args.command {
        PostCommands::Create {
            channel,
            content,
            kind,
            title,
        } => {
            let mut body = Body::new();
            put(&mut body, "channel_id", Some(channel));
            put(&mut body, "content", Some(content));
            put(&mut body, "type", Some(kind));
            put(&mut body, "title", title);

            let env = ctx
                .client()?
                .post(&api_path("/posts"), &body)
                .context("Failed to create post")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let post: Created = env.data_as().context("Failed to parse response")?;
            ctx.printer.success(&format!("Post created: {}", post.id));
        }
        PostCommands::Get { id } => {
            let env = ctx
                .client()?
                .get(&post_path(&id), &Query::new())
                .context("Failed to get post")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let result: PostWithThread = env.data_as().context("Failed to parse response")?;
            let post = &result.post;
            ctx.printer.line(&format!("ID: {}", post.id));
            ctx.printer.line(&format!("Type: {}", post.kind));
            if let Some(title) = post.title.as_deref().filter(|t| !t.is_empty()) {
                ctx.printer.line(&format!("Title: {title}"));
            }
            ctx.printer.line(&format!("Content: {}", post.content));
            if !result.thread.is_empty() {
                ctx.printer
                    .line(&format!("\nThread ({} replies):", result.thread.len()));
                for (i, reply) in result.thread.iter().enumerate() {
                    ctx.printer.line(&format!(
                        "  {}. {}: {}",
                        i + 1,
                        reply.id,
                        truncate(&reply.content, 60)
                    ));
                }
            }
        }
        PostCommands::List { channel, kind } => {
            let query = query_of([("channel_id", channel), ("type", kind)]);
            let env = ctx
                .client()?
                .get(&api_path("/posts"), &query)
                .context("Failed to list posts")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let posts: Vec<Post> = env.data_as().context("Failed to parse response")?;
            let rows: Vec<Vec<String>> = posts
                .iter()
                .map(|p| vec![p.id.clone(), p.kind.clone(), p.headline(40)])
                .collect();
            ctx.printer.rows(&rows);
        }
        PostCommands::Search { query } => {
            let query = query_of([("q", Some(query))]);
            let env = ctx
                .client()?
                .get(&api_path("/posts/search"), &query)
                .context("Search failed")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let posts: Vec<Post> = env.data_as().context("Failed to parse response")?;
            let rows: Vec<Vec<String>> = posts
                .iter()
                .map(|p| vec![p.id.clone(), p.headline(50)])
                .collect();
            ctx.printer.rows(&rows);
        }
        PostCommands::Reply {
            id,
            content,
            channel,
        } => {
            let mut body = Body::new();
            put(&mut body, "parent_id", Some(id));
            put(&mut body, "content", Some(content));
            put(&mut body, "channel_id", channel);

            let env = ctx
                .client()?
                .post(&api_path("/posts"), &body)
                .context("Failed to create reply")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let reply: Created = env.data_as().context("Failed to parse response")?;
            ctx.printer.success(&format!("Reply created: {}", reply.id));
        }
        PostCommands::Edit { id, title, content } => {
            let mut body = Body::new();
            put(&mut body, "title", title);
            put(&mut body, "content", content);
            if body.is_empty() {
                bail!("At least one of --title or --content is required");
            }

            let env = ctx
                .client()?
                .patch(&post_path(&id), &body)
                .context("Failed to edit post")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let post: Created = env.data_as().context("Failed to parse response")?;
            ctx.printer.success(&format!("Post updated: {}", post.id));
        }
        PostCommands::Delete { id } => {
            ctx.client()?
                .delete(&post_path(&id))
                .context("Failed to delete post")?;
            if ctx.printer.is_json() {
                return ctx.printer.json(&json!({ "status": "deleted", "id": id }));
            }
            ctx.printer.success(&format!("Post deleted: {id}"));
        }
        PostCommands::Reaction { command } => return reaction(command, ctx),
    }
    Ok(())
}

/// The emoji is a path segment, so it is percent-encoded (space as `%20`).
fn reaction_path(post_id: &str, emoji: &str) -> String {
    api_path(&format!(
        "/posts/{post_id}/reactions/{}",
        urlencoding::encode(emoji)
    ))
}

fn reaction(command: ReactionCommands, ctx: &CommandContext) -> Result<()> {
    match command {
        ReactionCommands::Add { id, emoji } => {
            let env = ctx
                .client()?
                .post(
                    &api_path(&format!("/posts/{id}/reactions")),
                    &json!({ "emoji": emoji }),
                )
                .context("Failed to add reaction")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let reaction: Created = env.data_as().context("Failed to parse response")?;
            ctx.printer
                .success(&format!("Reaction added: {}", reaction.id));
        }
        ReactionCommands::Remove { id, emoji } => {
            ctx.client()?
                .delete(&reaction_path(&id, &emoji))
                .context("Failed to remove reaction")?;
            if ctx.printer.is_json() {
                return ctx.printer.json(&json!({
                    "status": "removed",
                    "post_id": id,
                    "emoji": emoji,
                }));
            }
            ctx.printer
                .success(&format!("Reaction removed: {emoji} from post {id}"));
        }
        ReactionCommands::List { id } => {
            let env = ctx
                .client()?
                .get(&api_path(&format!("/posts/{id}/reactions")), &Query::new())
                .context("Failed to list reactions")?;
            if emit_json(ctx, &env)? {
                return Ok(());
            }
            let reactions: Vec<Reaction> =
                env.data_as().context("Failed to parse response")?;
            if reactions.is_empty() {
                ctx.printer.success("No reactions found");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = reactions
                .into_iter()
                .map(|r| vec![r.emoji, r.count.to_string(), r.user_id.unwrap_or_default()])
                .collect();
            ctx.printer.rows(&rows);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_falls_back_to_content() {
        let untitled = Post {
            content: "a rather long piece of content that goes on".into(),
            ..Post::default()
        };
        assert_eq!(untitled.headline(10), "a rathe...");

        let titled = Post {
            title: Some("Weekly update".into()),
            content: "ignored".into(),
            ..Post::default()
        };
        assert_eq!(titled.headline(10), "Weekly update");
    }

    #[test]
    fn reaction_path_encodes_emoji_as_segment() {
        assert_eq!(
            reaction_path("p1", "thumbs up"),
            "/api/v1/posts/p1/reactions/thumbs%20up"
        );
        assert_eq!(
            reaction_path("p1", "👍"),
            "/api/v1/posts/p1/reactions/%F0%9F%91%8D"
        );
        assert_eq!(reaction_path("p1", "a+b/c"), "/api/v1/posts/p1/reactions/a%2Bb%2Fc");
    }

    #[test]
    fn thread_payload_decodes() {
        let data: PostWithThread = serde_json::from_value(json!({
            "post": {"id": "p1", "type": "question", "title": null, "content": "why?"},
            "thread": [{"id": "p2", "content": "because"}]
        }))
        .unwrap();
        assert_eq!(data.post.kind, "question");
        assert_eq!(data.post.title, None);
        assert_eq!(data.thread.len(), 1);
    }
}
