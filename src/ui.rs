// UI layer: everything the user sees. The output mode is a plain value
// chosen once from the `--json` flag and handed to commands inside a
// `Printer`, so nothing here reads global state.

use anyhow::Result;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON, suitable for scripts.
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

/// Writes command output in the selected mode.
#[derive(Debug, Clone)]
pub struct Printer {
    mode: OutputMode,
    color: bool,
}

impl Printer {
    pub fn new(mode: OutputMode) -> Self {
        let color = mode == OutputMode::Text && std::io::stdout().is_tty();
        Printer { mode, color }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    pub fn success(&self, msg: &str) {
        println!("{}", format_success(self.mode, self.color, msg));
    }

    /// Text mode goes to stderr; JSON mode stays on stdout so scripts
    /// always get a parseable document.
    pub fn error(&self, msg: &str) {
        let out = format_error(self.mode, self.color, msg);
        match self.mode {
            OutputMode::Text => eprintln!("{out}"),
            OutputMode::Json => println!("{out}"),
        }
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Side remark for a human reader: stderr, dropped in JSON mode.
    pub fn note(&self, text: &str) {
        if let Some(out) = format_note(self.mode, text) {
            eprintln!("{out}");
        }
    }

    pub fn line(&self, text: &str) {
        println!("{text}");
    }

    /// One record per line, fields separated by two spaces.
    pub fn rows(&self, rows: &[Vec<String>]) {
        for row in rows {
            println!("{}", format_row(row));
        }
    }

    /// Spinner on stderr while a request runs. Hidden in JSON mode.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.is_json() {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(msg.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }
}

pub fn format_success(mode: OutputMode, color: bool, msg: &str) -> String {
    match mode {
        OutputMode::Json => status_json("success", msg),
        OutputMode::Text if color => format!("{} {}", "✓".green(), msg),
        OutputMode::Text => format!("✓ {msg}"),
    }
}

pub fn format_error(mode: OutputMode, color: bool, msg: &str) -> String {
    match mode {
        OutputMode::Json => status_json("error", msg),
        OutputMode::Text if color => format!("{} {}", "✗".red(), msg),
        OutputMode::Text => format!("✗ {msg}"),
    }
}

pub fn format_note(mode: OutputMode, msg: &str) -> Option<String> {
    match mode {
        OutputMode::Text => Some(msg.to_string()),
        OutputMode::Json => None,
    }
}

fn status_json(status: &str, msg: &str) -> String {
    let value = json!({ "status": status, "message": msg });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

pub fn format_row(fields: &[String]) -> String {
    fields.join("  ")
}

/// Shorten `s` to at most `max` characters, ending in `...` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max < 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// `"s"` unless `n == 1`.
pub fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `Password` hides input in the terminal.
pub fn prompt_password(prompt: &str) -> Result<String> {
    Ok(Password::new().with_prompt(prompt).interact()?)
}
