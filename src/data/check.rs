//! Check command result types for candidate commit messages.

use std::fmt;

use serde::Serialize;

use crate::message::{Severity, ValidationState};

/// Result of checking a candidate message against HEAD.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// HEAD commit hash (short form).
    pub head: String,
    /// Current HEAD message.
    pub original: String,
    /// Candidate replacement message.
    pub candidate: String,
    /// Whether the index has staged changes.
    pub has_staged: bool,
    /// Whether staged changes would be included in the amend.
    pub include_staged: bool,
    /// Validation outcome.
    pub validation: ValidationState,
}

impl CheckReport {
    /// Returns true if the rename would be refused.
    pub fn is_blocked(&self) -> bool {
        !self.validation.allowed
    }

    /// Renders the human-readable report.
    pub fn render_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("HEAD {}\n", self.head));
        output.push_str(&format!(
            "  current:   {}\n",
            crate::message::subject_line(&self.original)
        ));
        output.push_str(&format!(
            "  candidate: {}\n",
            crate::message::subject_line(&self.candidate)
        ));
        if self.has_staged {
            let staged = if self.include_staged {
                "included"
            } else {
                "kept out of the amend"
            };
            output.push_str(&format!("  staged changes: {staged}\n"));
        }

        match &self.validation.reason {
            Some(reason) => {
                let icon = match reason.severity() {
                    Severity::Error => "❌",
                    Severity::Warning => "⚠️ ",
                };
                output.push_str(&format!("{icon} {}: {reason}\n", reason.severity()));
            }
            None => output.push_str("✅ Message is ready to apply\n"),
        }

        output
    }
}

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
