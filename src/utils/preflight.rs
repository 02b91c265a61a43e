//! Preflight validation checks for early failure detection
//!
//! Commands call these before touching the repository so a missing `git`
//! binary or a wrong directory fails with a clear message.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::git::{GitCli, GitError, GitRepository, GitRunner};

/// Validate the git command-line tool is installed and runnable
///
/// Returns the version line reported by `git --version`.
pub fn check_git_cli(program: &str) -> Result<String> {
    let cli = GitCli::with_program(program, std::env::temp_dir());

    match cli.run(&["--version"]) {
        Ok(output) => Ok(output.trim().to_string()),
        Err(GitError::Spawn { source, .. }) => bail!(
            "Git ({program}) is not installed or not in PATH: {source}\n\
             Install git or point RENAME_COMMIT_GIT at a git executable."
        ),
        Err(e) => Err(e).context("Git is installed but `git --version` failed"),
    }
}

/// Validate `path` is inside a git repository and open it
pub fn check_git_repository(path: &Path, program: &str) -> Result<GitRepository> {
    GitRepository::discover_with_program(path, program).context(
        "Not in a git repository. Please run this command from within a git repository.",
    )
}

/// Combined preflight check for commands that touch a repository
///
/// Validates:
/// - git CLI availability
/// - Git repository access
pub fn check_rename_prerequisites(path: &Path, program: &str) -> Result<GitRepository> {
    let version = check_git_cli(program)?;
    tracing::debug!("Using {version}");
    check_git_repository(path, program)
}
