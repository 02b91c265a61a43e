//! Amend command — renames the HEAD commit.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use crate::cli::editor;
use crate::cli::{MessageArgs, RepoArgs};
use crate::git::{
    GitRepository, ProgressReporter, RenameError, RenameOutcome, RepositorySnapshot,
};
use crate::message::{self, ValidationState, Validator};
use crate::utils::{check_rename_prerequisites, Config};

/// Amend command options.
#[derive(Parser)]
pub struct AmendCommand {
    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Message source; the editor is opened when neither is given.
    #[command(flatten)]
    pub message: MessageArgs,

    /// Keep staged changes out of the amended commit.
    #[arg(long)]
    pub exclude_staged: bool,

    /// Apply without asking for confirmation after editing.
    #[arg(short, long)]
    pub yes: bool,
}

/// Prints progress updates to stdout.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&mut self, status: &str) {
        println!("🔄 {status}");
    }
}

/// Choice offered after an editor round.
#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Apply,
    Edit,
    Quit,
}

impl AmendCommand {
    /// Executes the amend command.
    pub fn execute(self) -> Result<()> {
        let config = Config::load().context("Failed to load configuration")?;
        let mut repo = check_rename_prerequisites(&self.repo.repo, &config.git_program)?;

        let snapshot = repo.snapshot()?;
        let old_head = snapshot
            .check_renamable()
            .map_err(RenameError::from)?
            .clone();

        let original = repo.head_message()?;
        let has_staged = self.detect_staged(&repo);
        let include_staged = !self.exclude_staged;
        let validator = Validator::new(config.subject_limit);

        let candidate = match self.message.read()? {
            Some(text) => {
                let text = text.trim().to_string();
                let state = validator.evaluate(
                    &text,
                    &original,
                    message::toggle_changed(has_staged, include_staged),
                );
                report_state(&state)?;
                text
            }
            None => self.edit_until_confirmed(
                &config,
                &validator,
                &original,
                has_staged,
                std::io::stdin().is_terminal(),
                &mut std::io::BufReader::new(std::io::stdin()),
            )?,
        };

        let outcome = repo.rename_head(
            &candidate,
            message::should_include_staged(has_staged, include_staged),
            &mut ConsoleProgress,
        )?;

        if let Some(warning) = restore_warning(&outcome) {
            eprintln!("{warning}");
        }
        println!("{}", result_line(old_head.short_hash(), repo.snapshot()));

        Ok(())
    }

    /// Reports staged changes, treating a failed query as none.
    fn detect_staged(&self, repo: &GitRepository) -> bool {
        let staged = match repo.staged_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list staged changes, assuming none: {e}");
                Vec::new()
            }
        };

        if staged.is_empty() {
            return false;
        }

        println!("⚠️  Warning: You have staged changes ({} file(s)).", staged.len());
        if self.exclude_staged {
            println!("   They will be kept out of the amended commit and restored afterwards.");
        } else {
            println!("   They will be included in the amended commit; pass --exclude-staged to keep them out.");
        }
        true
    }

    /// Runs editor rounds until the message is accepted or the user quits.
    ///
    /// `is_terminal` and `reader` are injected so tests can drive the loop
    /// without blocking on real stdin.
    fn edit_until_confirmed(
        &self,
        config: &Config,
        validator: &Validator,
        original: &str,
        has_staged: bool,
        is_terminal: bool,
        reader: &mut dyn BufRead,
    ) -> Result<String> {
        let editor = config.editor.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No message given and no editor configured.\n\
                 Pass --message/--file or set RENAME_COMMIT_EDITOR, GIT_EDITOR or EDITOR."
            )
        })?;

        let include_staged = !self.exclude_staged;
        let toggle_changed = message::toggle_changed(has_staged, include_staged);
        let mut draft = original.to_string();

        loop {
            let template = editor::message_template(&draft, has_staged, include_staged);
            let edited = editor::edit_message(editor, &template)?;
            let state = validator.evaluate(&edited, original, toggle_changed);

            if !state.allowed {
                let reason = blocking_reason(&state);
                if !is_terminal {
                    return Err(RenameError::Validation(reason).into());
                }
                println!("❌ {reason}");
                if !edited.is_empty() {
                    draft = edited;
                }
                match prompt_choice(reader, false)? {
                    Choice::Edit => continue,
                    Choice::Apply | Choice::Quit => {
                        return Err(RenameError::Validation(reason))
                            .context("Rename cancelled");
                    }
                }
            }

            if let Some(warning) = state.warning() {
                println!("⚠️  {warning}");
            }
            if self.yes || !is_terminal {
                return Ok(edited);
            }

            println!("\n{edited}\n");
            match prompt_choice(reader, true)? {
                Choice::Apply => return Ok(edited),
                Choice::Edit => draft = edited,
                Choice::Quit => anyhow::bail!("Rename cancelled"),
            }
        }
    }
}

/// Fails on a blocking validation result and prints any warning.
fn report_state(state: &ValidationState) -> Result<()> {
    if !state.allowed {
        return Err(RenameError::Validation(blocking_reason(state)).into());
    }
    if let Some(warning) = state.warning() {
        println!("⚠️  {warning}");
    }
    Ok(())
}

fn blocking_reason(state: &ValidationState) -> message::Reason {
    state.reason.clone().unwrap_or(message::Reason::Unchanged)
}

/// Asks whether to apply, edit again or quit. A closed stdin quits.
fn prompt_choice(reader: &mut dyn BufRead, can_apply: bool) -> Result<Choice> {
    loop {
        if can_apply {
            print!("❓ [A]pply, [E]dit again, or [Q]uit? [A/e/q] ");
        } else {
            print!("❓ [E]dit again or [Q]uit? [E/q] ");
        }
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes = reader.read_line(&mut input)?;
        if bytes == 0 {
            eprintln!("warning: stdin closed, cancelling rename");
            return Ok(Choice::Quit);
        }

        match input.trim().to_lowercase().as_str() {
            "a" | "apply" if can_apply => return Ok(Choice::Apply),
            "" if can_apply => return Ok(Choice::Apply),
            "" | "e" | "edit" => return Ok(Choice::Edit),
            "q" | "quit" => return Ok(Choice::Quit),
            _ => println!("Invalid choice."),
        }
    }
}

/// Text telling the user their staged changes are still stashed.
fn restore_warning(outcome: &RenameOutcome) -> Option<String> {
    outcome.restore_error().map(|e| {
        format!(
            "⚠️  Commit renamed, but failed to restore staged changes: {e}\n   \
             Your staged changes are still stashed; run `git stash pop --index` to restore them."
        )
    })
}

/// Summary line for a finished rename. The rename already happened, so a
/// failure to re-read HEAD only loses the new hash.
fn result_line(old_short: &str, snapshot: Result<RepositorySnapshot>) -> String {
    match snapshot {
        Ok(RepositorySnapshot {
            head: Some(head), ..
        }) => format!(
            "✅ Amended HEAD commit {} -> {}",
            old_short,
            head.short_hash()
        ),
        Ok(_) => "✅ Commit message successfully updated".to_string(),
        Err(e) => {
            warn!("Could not re-read HEAD after rename: {e:#}");
            "✅ Commit message successfully updated".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::git::GitError;

    #[test]
    fn prompt_defaults_to_apply() {
        let mut input = Cursor::new(b"\n".to_vec());
        assert_eq!(prompt_choice(&mut input, true).unwrap(), Choice::Apply);
    }

    #[test]
    fn prompt_defaults_to_edit_when_blocked() {
        let mut input = Cursor::new(b"\n".to_vec());
        assert_eq!(prompt_choice(&mut input, false).unwrap(), Choice::Edit);
    }

    #[test]
    fn prompt_rejects_apply_when_blocked() {
        let mut input = Cursor::new(b"a\nq\n".to_vec());
        assert_eq!(prompt_choice(&mut input, false).unwrap(), Choice::Quit);
    }

    #[test]
    fn prompt_retries_invalid_input() {
        let mut input = Cursor::new(b"x\nE\n".to_vec());
        assert_eq!(prompt_choice(&mut input, true).unwrap(), Choice::Edit);
    }

    #[test]
    fn closed_stdin_quits() {
        let mut input = Cursor::new(Vec::new());
        assert_eq!(prompt_choice(&mut input, true).unwrap(), Choice::Quit);
    }

    #[test]
    fn blocked_state_is_validation_error() {
        let state = message::evaluate("", "Initial commit", false);
        let err = report_state(&state).unwrap_err();
        assert_eq!(err.to_string(), "Commit message must not be empty.");
        assert!(err.downcast_ref::<RenameError>().is_some());
    }

    #[test]
    fn warning_state_is_allowed() {
        let state = message::evaluate(&"w".repeat(90), "Initial commit", false);
        assert!(report_state(&state).is_ok());
    }

    #[test]
    fn restore_warning_names_manual_pop() {
        let outcome = RenameOutcome::RenamedRestoreFailed(GitError::Failed {
            command: "stash pop --index".to_string(),
            code: Some(1),
            output: "notes.txt already exists, no checkout".to_string(),
        });
        let warning = restore_warning(&outcome).unwrap();
        assert!(warning.contains("notes.txt already exists, no checkout"));
        assert!(warning.contains("run `git stash pop --index` to restore them"));
        assert!(restore_warning(&RenameOutcome::Renamed).is_none());
    }

    #[test]
    fn unreadable_head_after_rename_still_reports_success() {
        let line = result_line("01234567", Err(anyhow::anyhow!("HEAD vanished")));
        assert_eq!(line, "✅ Commit message successfully updated");
    }

    fn amend_cmd(exclude_staged: bool, yes: bool) -> AmendCommand {
        AmendCommand {
            repo: RepoArgs {
                repo: std::path::PathBuf::from("."),
            },
            message: MessageArgs::default(),
            exclude_staged,
            yes,
        }
    }

    #[test]
    fn editor_required_without_message() {
        let config = Config::default();
        let err = amend_cmd(false, false)
            .edit_until_confirmed(
                &config,
                &Validator::default(),
                "Initial commit",
                false,
                false,
                &mut Cursor::new(Vec::new()),
            )
            .unwrap_err();
        assert!(err.to_string().contains("no editor configured"));
    }

    #[cfg(unix)]
    #[test]
    fn unchanged_editor_round_is_rejected_when_not_interactive() {
        let config = Config {
            editor: Some("true".to_string()),
            ..Config::default()
        };
        let err = amend_cmd(false, false)
            .edit_until_confirmed(
                &config,
                &Validator::default(),
                "Initial commit",
                false,
                false,
                &mut Cursor::new(Vec::new()),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Adjust the commit message or staged selection before confirming."
        );
    }

    #[cfg(unix)]
    #[test]
    fn unchanged_message_accepted_when_staged_selection_changes() {
        let config = Config {
            editor: Some("true".to_string()),
            ..Config::default()
        };
        let message = amend_cmd(true, true)
            .edit_until_confirmed(
                &config,
                &Validator::default(),
                "Initial commit",
                true,
                true,
                &mut Cursor::new(Vec::new()),
            )
            .unwrap();
        assert_eq!(message, "Initial commit");
    }

    #[cfg(unix)]
    #[test]
    fn quitting_after_blocked_round_cancels() {
        let config = Config {
            editor: Some("true".to_string()),
            ..Config::default()
        };
        let err = amend_cmd(false, false)
            .edit_until_confirmed(
                &config,
                &Validator::default(),
                "Initial commit",
                false,
                true,
                &mut Cursor::new(b"q\n".to_vec()),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Rename cancelled");
    }
}
