//! Repository status view printed by the `status` command.

use serde::Serialize;

use crate::git::{HeadCommit, OperationState, RepositorySnapshot};

/// Everything that decides whether HEAD can be renamed right now.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    /// Tool version.
    pub version: String,
    /// Working tree root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Current branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Operation in progress.
    pub state: OperationState,
    /// Whether HEAD is detached.
    pub detached: bool,
    /// HEAD commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<HeadView>,
    /// Paths with staged changes.
    pub staged_files: Vec<String>,
    /// Whether a rename can run.
    pub renamable: bool,
    /// Why a rename cannot run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

/// HEAD commit as shown in the status view.
#[derive(Debug, Clone, Serialize)]
pub struct HeadView {
    /// Abbreviated hash.
    pub short_hash: String,
    /// Full commit.
    #[serde(flatten)]
    pub commit: HeadCommit,
}

impl StatusView {
    /// Builds the view from a snapshot and the staged file list.
    pub fn new(snapshot: &RepositorySnapshot, staged_files: Vec<String>) -> Self {
        let blocked_reason = snapshot.check_renamable().err().map(|e| e.to_string());

        Self {
            version: crate::VERSION.to_string(),
            repository: snapshot
                .workdir
                .as_ref()
                .map(|path| path.display().to_string()),
            branch: snapshot.branch.clone(),
            state: snapshot.state,
            detached: snapshot.detached,
            head: snapshot.head.as_ref().map(|commit| HeadView {
                short_hash: commit.short_hash().to_string(),
                commit: commit.clone(),
            }),
            staged_files,
            renamable: blocked_reason.is_none(),
            blocked_reason,
        }
    }
}
