//! # rename-commit
//!
//! Rewrites the message of the most recent Git commit.
//!
//! Staged changes can be kept out of the amended commit: they are stashed
//! before `git commit --amend` and restored with `git stash pop --index`
//! afterwards, whether or not the amend succeeded.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rename_commit::git::{rename::NoProgress, GitRepository};
//!
//! let mut repo = GitRepository::open()?;
//! let snapshot = repo.snapshot()?;
//! snapshot.check_renamable()?;
//! repo.rename_head("Fix typo in README", false, &mut NoProgress)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod data;
pub mod git;
pub mod message;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of rename-commit.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
