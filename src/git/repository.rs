//! Git repository access and rename preconditions.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{Repository, RepositoryState};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::git::rename::{self, ProgressReporter, RenameError, RenameOutcome};
use crate::git::runner::{GitCli, GitError, GitRunner};

/// Reasons a repository cannot have its HEAD commit renamed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// Bare repositories have nothing to amend from.
    #[error("Repository has no working tree")]
    NoWorkingTree,

    /// HEAD does not point at a commit yet.
    #[error("Repository does not contain commits to rename yet")]
    NoCommits,

    /// A rebase, merge or similar operation is in progress.
    #[error(
        "Cannot rename commit while Git is performing another operation ({0} in progress)"
    )]
    OperationInProgress(OperationState),

    /// HEAD is not on a branch.
    #[error("Cannot rename commit in detached HEAD state")]
    DetachedHead,
}

/// Multi-step operation the repository is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationState {
    /// No operation in progress.
    Clean,
    /// Merge in progress.
    Merge,
    /// Rebase in progress, interactive or not.
    Rebase,
    /// Cherry-pick in progress.
    CherryPick,
    /// Revert in progress.
    Revert,
    /// Bisect in progress.
    Bisect,
    /// `git am` in progress.
    ApplyMailbox,
}

impl From<RepositoryState> for OperationState {
    fn from(state: RepositoryState) -> Self {
        match state {
            RepositoryState::Clean => OperationState::Clean,
            RepositoryState::Merge => OperationState::Merge,
            RepositoryState::Rebase
            | RepositoryState::RebaseInteractive
            | RepositoryState::RebaseMerge
            | RepositoryState::ApplyMailboxOrRebase => OperationState::Rebase,
            RepositoryState::CherryPick | RepositoryState::CherryPickSequence => {
                OperationState::CherryPick
            }
            RepositoryState::Revert | RepositoryState::RevertSequence => OperationState::Revert,
            RepositoryState::Bisect => OperationState::Bisect,
            RepositoryState::ApplyMailbox => OperationState::ApplyMailbox,
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationState::Clean => "no operation",
            OperationState::Merge => "merge",
            OperationState::Rebase => "rebase",
            OperationState::CherryPick => "cherry-pick",
            OperationState::Revert => "revert",
            OperationState::Bisect => "bisect",
            OperationState::ApplyMailbox => "am",
        };
        f.write_str(name)
    }
}

/// Summary of the commit HEAD points at.
#[derive(Debug, Clone, Serialize)]
pub struct HeadCommit {
    /// Full commit hash.
    pub hash: String,
    /// Author name.
    pub author: String,
    /// Commit timestamp with the committer's offset.
    pub date: DateTime<FixedOffset>,
    /// Full commit message as stored in the commit object.
    pub message: String,
}

impl HeadCommit {
    /// Abbreviated commit hash.
    pub fn short_hash(&self) -> &str {
        &self.hash[..crate::git::SHORT_HASH_LEN.min(self.hash.len())]
    }
}

/// Read-only view of the state relevant to renaming HEAD.
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    /// Working tree root, absent for bare repositories.
    pub workdir: Option<PathBuf>,
    /// HEAD commit, absent before the first commit.
    pub head: Option<HeadCommit>,
    /// Current branch name, absent when detached or unborn.
    pub branch: Option<String>,
    /// Operation in progress.
    pub state: OperationState,
    /// Whether HEAD is detached.
    pub detached: bool,
}

impl RepositorySnapshot {
    /// Checks that HEAD can be renamed and returns the HEAD commit.
    ///
    /// Checks run in order: working tree, commits, operation state, detached HEAD.
    pub fn check_renamable(&self) -> Result<&HeadCommit, PreconditionError> {
        if self.workdir.is_none() {
            return Err(PreconditionError::NoWorkingTree);
        }
        let head = self.head.as_ref().ok_or(PreconditionError::NoCommits)?;
        if self.state != OperationState::Clean {
            return Err(PreconditionError::OperationInProgress(self.state));
        }
        if self.detached {
            return Err(PreconditionError::DetachedHead);
        }
        Ok(head)
    }
}

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
    cli: GitCli,
}

impl GitRepository {
    /// Opens the repository containing the current directory.
    pub fn open() -> Result<Self> {
        Self::discover(".")
    }

    /// Opens the repository containing `path`, searching parent directories.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::discover_with_program(path, "git")
    }

    /// Opens the repository containing `path`, running `program` for git commands.
    pub fn discover_with_program<P: AsRef<Path>>(path: P, program: &str) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .with_context(|| format!("Not in a git repository: {}", path.display()))?;

        // Bare repositories still get a runner so preconditions can report them.
        let root = repo
            .workdir()
            .map_or_else(|| repo.path().to_path_buf(), Path::to_path_buf);
        debug!(root = %root.display(), "Opened repository");

        Ok(Self {
            cli: GitCli::with_program(program, root),
            repo,
        })
    }

    /// Reads the current repository state.
    pub fn snapshot(&self) -> Result<RepositorySnapshot> {
        let head = match self.repo.head() {
            Ok(reference) => {
                let commit = reference
                    .peel_to_commit()
                    .context("Failed to peel HEAD to commit")?;
                Some(head_commit(&commit)?)
            }
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(e).context("Failed to get HEAD reference"),
        };

        let detached = self
            .repo
            .head_detached()
            .context("Failed to determine whether HEAD is detached")?;

        let branch = if detached {
            None
        } else {
            self.repo
                .head()
                .ok()
                .and_then(|reference| reference.shorthand().map(String::from))
        };

        Ok(RepositorySnapshot {
            workdir: self.repo.workdir().map(Path::to_path_buf),
            head,
            branch,
            state: self.repo.state().into(),
            detached,
        })
    }

    /// Reads the HEAD commit message the way `git log -1 --pretty=%B` prints it.
    pub fn head_message(&self) -> Result<String, RenameError> {
        let message = self
            .cli
            .run(&["log", "-1", "--pretty=%B"])
            .map_err(RenameError::HeadMessage)?;
        let message = message.trim();
        if message.is_empty() {
            return Err(RenameError::EmptyHeadMessage);
        }
        Ok(message.to_string())
    }

    /// Lists paths with staged changes.
    pub fn staged_files(&self) -> Result<Vec<String>, GitError> {
        let output = self.cli.run(&["diff", "--cached", "--name-only"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Renames HEAD and re-reads the repository once the amend went through.
    pub fn rename_head(
        &mut self,
        new_message: &str,
        include_staged: bool,
        progress: &mut dyn ProgressReporter,
    ) -> Result<RenameOutcome, RenameError> {
        let outcome = rename::perform_rename(&self.cli, new_message, include_staged, progress)?;
        let refreshed = self.refresh();
        after_refresh(outcome, refreshed)
    }

    /// Re-opens the repository so cached state reflects the current HEAD.
    pub fn refresh(&mut self) -> Result<(), git2::Error> {
        self.repo = Repository::open(self.repo.path())?;
        Ok(())
    }
}

/// Combines a rename outcome with the refresh that followed it, keeping a
/// restore failure visible when the refresh also fails.
fn after_refresh(
    outcome: RenameOutcome,
    refreshed: Result<(), git2::Error>,
) -> Result<RenameOutcome, RenameError> {
    match refreshed {
        Ok(()) => Ok(outcome),
        Err(source) => Err(RenameError::Refresh {
            source,
            restore: outcome.into_restore_error(),
        }),
    }
}

fn is_unborn(error: &git2::Error) -> bool {
    matches!(
        error.code(),
        git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
    )
}

fn head_commit(commit: &git2::Commit<'_>) -> Result<HeadCommit> {
    let time = commit.time();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    let date = DateTime::from_timestamp(time.seconds(), 0)
        .context("Invalid commit timestamp")?
        .with_timezone(&offset);

    Ok(HeadCommit {
        hash: commit.id().to_string(),
        author: commit.author().name().unwrap_or("unknown").to_string(),
        date,
        message: commit.message().unwrap_or("").trim().to_string(),
    })
}
