//! Renaming the HEAD commit with optional restashing of staged changes.
//!
//! When staged changes must stay out of the amended commit they are stashed
//! before `git commit --amend` and popped back with `--index` afterwards.
//! The pop runs whether or not the amend succeeded; a failed pop never hides
//! an amend failure and is never swallowed.

use thiserror::Error;
use tracing::{debug, warn};

use crate::git::repository::PreconditionError;
use crate::git::runner::{GitError, GitRunner};
use crate::message::Reason;

/// Message recorded on the temporary stash.
pub const STASH_MESSAGE: &str = "Temporary stash for commit rename";

/// Errors that stop a rename.
#[derive(Error, Debug)]
pub enum RenameError {
    /// The repository is not in a state that allows renaming HEAD.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The candidate message was rejected.
    #[error("{0}")]
    Validation(Reason),

    /// The current HEAD message could not be read.
    #[error("Failed to retrieve current commit message: {0}")]
    HeadMessage(#[source] GitError),

    /// HEAD has an empty message.
    #[error("Failed to retrieve current commit message")]
    EmptyHeadMessage,

    /// Staged changes could not be stashed; the amend was not attempted.
    #[error("Failed to stash staged changes, commit was not renamed: {0}")]
    Stash(#[source] GitError),

    /// `git commit --amend` failed, possibly followed by a failed restore.
    #[error("Failed to rename commit: {source}{}", restore_note(.restore))]
    Amend {
        /// The amend failure.
        #[source]
        source: GitError,
        /// Restore failure that followed the amend failure, if any.
        restore: Option<GitError>,
    },

    /// The repository could not be re-read after the amend.
    #[error(
        "Commit renamed, but failed to refresh repository state: {source}{}",
        restore_note(.restore)
    )]
    Refresh {
        /// The re-open failure.
        #[source]
        source: git2::Error,
        /// Restore failure that followed the successful amend, if any.
        restore: Option<GitError>,
    },
}

fn restore_note(restore: &Option<GitError>) -> String {
    restore.as_ref().map_or_else(String::new, |e| {
        format!(
            "; additionally failed to restore staged changes ({e}), run `git stash pop --index` manually"
        )
    })
}

/// Successful rename results.
#[derive(Debug)]
pub enum RenameOutcome {
    /// HEAD was renamed and any stashed changes were restored.
    Renamed,
    /// HEAD was renamed but the temporary stash could not be popped.
    RenamedRestoreFailed(GitError),
}

impl RenameOutcome {
    /// Returns the restore failure, if any.
    pub fn restore_error(&self) -> Option<&GitError> {
        match self {
            RenameOutcome::Renamed => None,
            RenameOutcome::RenamedRestoreFailed(e) => Some(e),
        }
    }

    /// Consumes the outcome, returning the restore failure, if any.
    pub fn into_restore_error(self) -> Option<GitError> {
        match self {
            RenameOutcome::Renamed => None,
            RenameOutcome::RenamedRestoreFailed(e) => Some(e),
        }
    }
}

/// Receives status text while a rename is running.
pub trait ProgressReporter {
    /// Reports the step that is about to run.
    fn report(&mut self, status: &str);
}

/// Discards progress updates.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _status: &str) {}
}

impl ProgressReporter for Vec<String> {
    fn report(&mut self, status: &str) {
        self.push(status.to_string());
    }
}

/// Returns whether the index differs from HEAD.
///
/// A failing query counts as "no staged changes" so the rename can still go
/// ahead; the failure is logged.
pub fn has_staged_changes<R: GitRunner>(git: &R) -> bool {
    match git.run(&["diff", "--cached", "--name-only"]) {
        Ok(output) => !output.trim().is_empty(),
        Err(e) => {
            warn!("Could not detect staged changes, assuming none: {e}");
            false
        }
    }
}

/// Returns the commit `refs/stash` points at, if any.
fn stash_tip<R: GitRunner>(git: &R) -> Option<String> {
    git.run(&["rev-parse", "-q", "--verify", "refs/stash"])
        .ok()
        .map(|output| output.trim().to_string())
        .filter(|tip| !tip.is_empty())
}

/// Stashes the index, falling back to a full stash when
/// `stash push --staged` is unavailable or refuses the working tree.
///
/// `stash push --staged` can record a stash and still exit non-zero when a
/// path has both staged and unstaged edits. That entry is dropped before the
/// fallback so exactly one temporary stash exists afterwards.
pub fn stash_staged_changes<R: GitRunner>(git: &R) -> Result<(), GitError> {
    let tip_before = stash_tip(git);
    match git.run(&["stash", "push", "--staged", "--message", STASH_MESSAGE]) {
        Ok(_) => Ok(()),
        Err(e) => {
            if stash_tip(git) != tip_before {
                warn!("`git stash push --staged` failed after saving a stash, dropping it: {e}");
                git.run(&["stash", "drop"])?;
            }
            warn!("`git stash push --staged` failed, retrying with a full stash: {e}");
            git.run(&["stash", "push", "--message", STASH_MESSAGE])
                .map(|_| ())
        }
    }
}

/// Pops the temporary stash, restoring the staged/unstaged split.
pub fn restore_staged_changes<R: GitRunner>(git: &R) -> Result<(), GitError> {
    git.run(&["stash", "pop", "--index"]).map(|_| ())
}

/// Rewrites the HEAD commit message.
pub fn amend_head<R: GitRunner>(git: &R, new_message: &str) -> Result<(), GitError> {
    git.run(&["commit", "--amend", "-m", new_message]).map(|_| ())
}

/// Renames HEAD to `new_message`.
///
/// With `include_staged` false, staged changes are kept out of the amended
/// commit by stashing them first and restoring them afterwards.
/// Preconditions are the caller's responsibility.
pub fn perform_rename<R: GitRunner>(
    git: &R,
    new_message: &str,
    include_staged: bool,
    progress: &mut dyn ProgressReporter,
) -> Result<RenameOutcome, RenameError> {
    progress.report("Preparing commit amendment...");

    let need_stash = !include_staged && has_staged_changes(git);
    debug!(include_staged, need_stash, "Starting rename");

    if need_stash {
        progress.report("Temporarily stashing staged changes...");
        stash_staged_changes(git).map_err(RenameError::Stash)?;
    }
    let stashed = need_stash;

    progress.report("Amending commit...");
    let amended = amend_head(git, new_message);

    let restored = if stashed {
        progress.report("Restoring staged changes...");
        restore_staged_changes(git)
    } else {
        Ok(())
    };

    match (amended, restored) {
        (Ok(()), Ok(())) => Ok(RenameOutcome::Renamed),
        (Ok(()), Err(restore)) => {
            warn!("Commit renamed, but failed to restore staged changes: {restore}");
            Ok(RenameOutcome::RenamedRestoreFailed(restore))
        }
        (Err(source), restored) => Err(RenameError::Amend {
            source,
            restore: restored.err(),
        }),
    }
}
