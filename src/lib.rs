// Library root
// -----------
// This crate exposes the library surface behind the `agenthq` binary.
//
// Module responsibilities:
// - `config`: the persisted identity record (hub URL and credentials).
// - `api`: the blocking hub client and the response envelope it decodes.
// - `error`: the error taxonomy for hub calls.
// - `ui`: output mode, printing, spinners and prompts.
// - `logging`: diagnostic tracing setup.
// - `cli` / `commands`: the command tree and one module per hub resource.
//
// Everything a caller needs to talk to a hub lives in `config` + `api`;
// the command layer only builds paths and bodies on top of them.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

pub use api::{Envelope, HubClient, Pagination, Query};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
