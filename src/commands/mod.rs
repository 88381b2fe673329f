// One module per hub resource. Commands are thin: build a path, a query or
// a body, make one call through `HubClient`, render the payload.

pub mod activity;
pub mod agents;
pub mod auth;
pub mod channels;
pub mod discover;
pub mod dm;
pub mod insights;
pub mod notifications;
pub mod org;
pub mod posts;
pub mod settings;
pub mod tasks;

use anyhow::Result;
use serde_json::Value;

use crate::api::{Body, Envelope, Query};
use crate::cli::CommandContext;

/// Prefix for versioned hub endpoints.
pub(crate) fn api_path(suffix: &str) -> String {
    format!("/api/v1{suffix}")
}

/// Insert `value` under `key` unless it is absent or empty.
pub(crate) fn put(body: &mut Body, key: &str, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        body.insert(key.to_string(), Value::String(v));
    }
}

/// Build a query from optional filters, skipping absent or empty ones.
pub(crate) fn query_of<const N: usize>(pairs: [(&str, Option<String>); N]) -> Query {
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k.to_string(), v)))
        .collect()
}

/// In JSON mode print the raw payload and return `true`.
pub(crate) fn emit_json(ctx: &CommandContext, env: &Envelope) -> Result<bool> {
    if ctx.printer.is_json() {
        ctx.printer.json(env.data())?;
        return Ok(true);
    }
    Ok(false)
}

/// Tell the user when the hub has more than the page shown.
pub(crate) fn note_more(ctx: &CommandContext, env: &Envelope, shown: usize, noun: &str) {
    if let Some(p) = env.pagination.as_ref().filter(|p| p.has_more) {
        ctx.printer.line(&format!(
            "\nShowing {shown} of {} {noun}. Use --json for full data.",
            p.total
        ));
    }
}
