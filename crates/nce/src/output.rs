//! Output formatting and status lines.
//!
//! Results go to stdout in the format selected by `--output`. Status
//! lines ("Request in progress", "Access token saved") go to stderr,
//! colored per `--color`, and disappear with `--quiet`.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether status lines should be colored.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Writer for progress and outcome lines on stderr.
#[derive(Debug, Clone, Copy)]
pub struct Status {
    quiet: bool,
    color: bool,
}

impl Status {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            quiet: global.quiet,
            color: should_color(global.color),
        }
    }

    pub fn info(self, message: &str) {
        if self.color {
            self.emit(&message.cyan().to_string());
        } else {
            self.emit(message);
        }
    }

    pub fn success(self, message: &str) {
        if self.color {
            self.emit(&message.green().to_string());
        } else {
            self.emit(message);
        }
    }

    pub fn failure(self, message: &str) {
        if self.color {
            self.emit(&message.red().bold().to_string());
        } else {
            self.emit(message);
        }
    }

    fn emit(self, line: &str) {
        if self.quiet {
            return;
        }
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}

// ── Structured output ────────────────────────────────────────────────

/// Render `data` as JSON or YAML. `None` for text output, where each
/// command formats its own view.
pub fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<Option<String>, CliError> {
    match format {
        OutputFormat::Text => Ok(None),
        OutputFormat::Json => render_json_pretty(data).map(Some),
        OutputFormat::Yaml => serde_yaml::to_string(data)
            .map(|s| Some(s.trim_end().to_owned()))
            .map_err(|e| CliError::Serialization(e.to_string())),
    }
}

/// Pretty-printed JSON.
pub fn render_json_pretty<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(data).map_err(|e| CliError::Serialization(e.to_string()))
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
