//! Git operations and repository management.

pub mod rename;
pub mod repository;
pub mod runner;

pub use rename::{perform_rename, ProgressReporter, RenameError, RenameOutcome};
pub use repository::{
    GitRepository, HeadCommit, OperationState, PreconditionError, RepositorySnapshot,
};
pub use runner::{GitCli, GitError, GitRunner};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
