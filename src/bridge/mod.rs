//! Records service bridge.
//!
//! Every remote operation goes through [`RecordsService::call`]. The shipped
//! implementation is [`ScriptBridge`], which runs the service executable once
//! per command and waits for it to exit.
//!
//! Output policy, applied to every command:
//! - stdout (trailing line breaks removed) is the reply body;
//! - stderr is kept as a separate channel and only merged, as `ERROR: ` lines,
//!   into [`ServiceReply::display_text`];
//! - a non-zero exit is advisory: it is recorded on the reply and appended to
//!   the display text, never turned into an error.

mod command;
mod locate;
mod process;

use std::process::Output;

use thiserror::Error;

pub use command::{Command, ProfileFields};
pub use locate::ServiceLocation;
pub use process::ScriptBridge;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Script not found.")]
    ScriptNotFound,
    #[error("failed to run records service: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Text for the user: the fixed missing-script notice, or `io_message`.
    pub fn user_message(&self, io_message: &str) -> String {
        match self {
            BridgeError::ScriptNotFound => self.to_string(),
            BridgeError::Io(_) => io_message.to_string(),
        }
    }
}

pub trait RecordsService {
    fn call(&self, command: &Command) -> Result<ServiceReply, BridgeError>;
}

/// What the service printed and how it exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    pub stdout: String,
    pub stderr: Vec<String>,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ServiceReply {
    /// A clean reply: the given stdout, no stderr, exit code 0.
    #[cfg(test)]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: trim_line_breaks(&stdout.into()).to_string(),
            stderr: Vec::new(),
            exit_code: Some(0),
        }
    }

    pub(crate) fn from_output(output: &Output) -> Self {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Self {
            stdout: trim_line_breaks(&stdout).to_string(),
            stderr: stderr
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            exit_code: output.status.code(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn body(&self) -> &str {
        &self.stdout
    }

    /// Text shown to the user: stdout, then stderr lines, then the exit warning.
    pub fn display_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if !self.stdout.is_empty() {
            lines.push(self.stdout.clone());
        }
        lines.extend(self.stderr.iter().map(|l| format!("ERROR: {l}")));
        if !self.success() {
            match self.exit_code {
                Some(code) => lines.push(format!("Script exited with error code: {code}")),
                None => lines.push("Script terminated by a signal".to_string()),
            }
        }
        lines.join("\n")
    }
}

fn trim_line_breaks(s: &str) -> &str {
    s.trim_end_matches(['\r', '\n'])
}
