//! Commit message validation.
//!
//! A candidate message is checked against the message it replaces before
//! any amend is attempted. Evaluation is a pure function of the candidate
//! text, the original message and whether the staged-changes selection was
//! changed, so callers re-run it every time either input changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default maximum length of the first line before a warning is raised.
pub const DEFAULT_SUBJECT_LIMIT: usize = 72;

/// How serious a validation reason is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the rename.
    Error,
    /// Informational only; the rename may proceed.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Why a candidate message was rejected or flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Reason {
    /// The message is empty after trimming.
    Empty,
    /// Neither the message nor the staged selection changed.
    Unchanged,
    /// The first line is longer than the configured limit.
    SubjectTooLong {
        /// Length of the first line in characters.
        length: usize,
        /// Configured limit.
        limit: usize,
    },
}

impl Reason {
    /// Returns the severity of this reason.
    pub fn severity(&self) -> Severity {
        match self {
            Reason::Empty | Reason::Unchanged => Severity::Error,
            Reason::SubjectTooLong { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Empty => write!(f, "Commit message must not be empty."),
            Reason::Unchanged => write!(
                f,
                "Adjust the commit message or staged selection before confirming."
            ),
            Reason::SubjectTooLong { length, limit } => write!(
                f,
                "First line should not exceed {limit} characters (currently {length})"
            ),
        }
    }
}

/// Outcome of evaluating a candidate message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationState {
    /// Whether the rename may be submitted.
    pub allowed: bool,
    /// Reason shown to the user, blocking or not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl ValidationState {
    /// Returns the reason only when it is a warning.
    pub fn warning(&self) -> Option<&Reason> {
        self.reason
            .as_ref()
            .filter(|reason| reason.severity() == Severity::Warning)
    }
}

/// Validates candidate commit messages.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    subject_limit: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_SUBJECT_LIMIT)
    }
}

impl Validator {
    /// Creates a validator with the given first-line warning limit.
    pub fn new(subject_limit: usize) -> Self {
        Self { subject_limit }
    }

    /// Evaluates `text` against `original`.
    ///
    /// Rules in priority order: an empty message is rejected; an unchanged
    /// message with an unchanged staged selection is rejected; an overlong
    /// first line is reported as a warning but still allowed.
    pub fn evaluate(&self, text: &str, original: &str, toggle_changed: bool) -> ValidationState {
        let text = text.trim();

        if text.is_empty() {
            return ValidationState {
                allowed: false,
                reason: Some(Reason::Empty),
            };
        }

        if text == original.trim() && !toggle_changed {
            return ValidationState {
                allowed: false,
                reason: Some(Reason::Unchanged),
            };
        }

        let length = subject_line(text).chars().count();
        let reason = (length > self.subject_limit).then_some(Reason::SubjectTooLong {
            length,
            limit: self.subject_limit,
        });

        ValidationState {
            allowed: true,
            reason,
        }
    }
}

/// Evaluates a candidate with the default subject limit.
pub fn evaluate(text: &str, original: &str, toggle_changed: bool) -> ValidationState {
    Validator::default().evaluate(text, original, toggle_changed)
}

/// Whether the staged selection differs from its initial "include" state.
///
/// The selection only exists when the repository has staged changes.
pub fn toggle_changed(has_staged: bool, include_staged: bool) -> bool {
    has_staged && !include_staged
}

/// Whether the amend should include staged changes.
pub fn should_include_staged(has_staged: bool, include_staged: bool) -> bool {
    !has_staged || include_staged
}

/// First line of a message.
pub fn subject_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Removes `#` comment lines and surrounding whitespace from editor output.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_message_rejected() {
        let state = evaluate("   \n\t", "Initial commit", true);
        assert!(!state.allowed);
        assert_eq!(state.reason, Some(Reason::Empty));
        assert_eq!(
            state.reason.unwrap().to_string(),
            "Commit message must not be empty."
        );
    }

    #[test]
    fn unchanged_message_rejected() {
        let state = evaluate("Initial commit\n", "Initial commit", false);
        assert!(!state.allowed);
        assert_eq!(state.reason, Some(Reason::Unchanged));
    }

    #[test]
    fn unchanged_message_allowed_when_toggle_changed() {
        let state = evaluate("Initial commit", "Initial commit", true);
        assert!(state.allowed);
        assert_eq!(state.reason, None);
    }

    #[test]
    fn long_subject_is_warning_only() {
        let subject = "x".repeat(73);
        let state = evaluate(&format!("{subject}\n\nbody"), "Initial commit", false);
        assert!(state.allowed);
        assert_eq!(
            state.reason,
            Some(Reason::SubjectTooLong {
                length: 73,
                limit: 72
            })
        );
        assert_eq!(
            state.warning().map(ToString::to_string).as_deref(),
            Some("First line should not exceed 72 characters (currently 73)")
        );
    }

    #[test]
    fn subject_at_limit_is_clean() {
        let state = evaluate(&"y".repeat(72), "Initial commit", false);
        assert!(state.allowed);
        assert!(state.reason.is_none());
    }

    #[test]
    fn subject_length_counts_characters_not_bytes() {
        let state = Validator::new(5).evaluate("héllo", "Initial commit", false);
        assert!(state.reason.is_none());
    }

    #[test]
    fn empty_takes_priority_over_unchanged() {
        let state = evaluate("", "", false);
        assert_eq!(state.reason, Some(Reason::Empty));
    }

    #[test]
    fn severities() {
        assert_eq!(Reason::Empty.severity(), Severity::Error);
        assert_eq!(Reason::Unchanged.severity(), Severity::Error);
        assert_eq!(
            Reason::SubjectTooLong { length: 80, limit: 72 }.severity(),
            Severity::Warning
        );
    }

    #[test]
    fn toggle_only_exists_with_staged_changes() {
        assert!(toggle_changed(true, false));
        assert!(!toggle_changed(true, true));
        assert!(!toggle_changed(false, false));

        assert!(should_include_staged(false, false));
        assert!(should_include_staged(true, true));
        assert!(!should_include_staged(true, false));
    }

    #[test]
    fn strip_comments_drops_hash_lines() {
        let edited = "Fix typo\n\nLonger body\n# Please enter the commit message\n#\n";
        assert_eq!(strip_comments(edited), "Fix typo\n\nLonger body");
    }

    #[test]
    fn subject_line_of_empty_message() {
        assert_eq!(subject_line(""), "");
        assert_eq!(subject_line("one\ntwo"), "one");
    }

    proptest! {
        #[test]
        fn differing_non_empty_message_is_allowed(
            candidate in "[a-zA-Z0-9 ]{0,40}[a-zA-Z0-9]",
            original in "[a-zA-Z0-9 ]{0,40}",
            toggle in any::<bool>(),
        ) {
            prop_assume!(candidate.trim() != original.trim());
            let state = evaluate(&candidate, &original, toggle);
            prop_assert!(state.allowed);
        }

        #[test]
        fn unchanged_message_without_toggle_is_rejected(original in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,60}") {
            let state = evaluate(&original, &original, false);
            prop_assert!(!state.allowed);
            prop_assert_eq!(state.reason, Some(Reason::Unchanged));
        }
    }
}
