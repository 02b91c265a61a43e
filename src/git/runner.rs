//! Execution of `git` subcommands.
//!
//! Everything the rename workflow does to a repository goes through
//! [`GitRunner`], so the workflow can be driven against a scripted runner in
//! tests and against the real `git` binary via [`GitCli`].

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors produced while running a git subcommand.
#[derive(Error, Debug)]
pub enum GitError {
    /// The git process could not be started at all.
    #[error("Failed to execute `git {command}`: {source}")]
    Spawn {
        /// The subcommand line that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The git process ran but exited unsuccessfully.
    #[error("`git {command}` failed: {output}")]
    Failed {
        /// The subcommand line that failed.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Error output reported by git, verbatim.
        output: String,
    },
}

impl GitError {
    /// Returns the raw output git reported for a failed command.
    pub fn output(&self) -> Option<&str> {
        match self {
            GitError::Failed { output, .. } => Some(output),
            GitError::Spawn { .. } => None,
        }
    }
}

/// Runs git subcommands against one repository.
pub trait GitRunner {
    /// Runs `git <args>` and returns its standard output on success.
    fn run(&self, args: &[&str]) -> Result<String, GitError>;
}

/// Runs the `git` command-line tool inside a working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    workdir: PathBuf,
}

impl GitCli {
    /// Creates a runner for the default `git` program.
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        Self::with_program("git", workdir)
    }

    /// Creates a runner that invokes `program` instead of `git`.
    pub fn with_program<P: AsRef<Path>>(program: impl Into<String>, workdir: P) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.as_ref().to_path_buf(),
        }
    }
}

impl GitRunner for GitCli {
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        debug!(program = %self.program, workdir = %self.workdir.display(), "git {command}");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // `git commit` reports "nothing to commit" and hook output on stdout.
            let output_text = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            debug!(code = ?output.status.code(), "git {command} failed: {output_text}");
            return Err(GitError::Failed {
                command,
                code: output.status.code(),
                output: output_text,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_error_surfaces_output_verbatim() {
        let err = GitError::Failed {
            command: "stash pop --index".to_string(),
            code: Some(1),
            output: "error: conflict in README.md".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`git stash pop --index` failed: error: conflict in README.md"
        );
        assert_eq!(err.output(), Some("error: conflict in README.md"));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cli = GitCli::with_program("definitely-not-a-git-binary-4242", temp_dir.path());
        let err = cli.run(&["--version"]).unwrap_err();
        assert!(matches!(err, GitError::Spawn { .. }), "got {err:?}");
        assert!(err.output().is_none());
    }

    #[test]
    fn runs_in_workdir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cli = GitCli::new(temp_dir.path());
        cli.run(&["init", "--quiet"]).unwrap();
        assert!(temp_dir.path().join(".git").is_dir());
    }

    #[test]
    fn failed_command_reports_exit_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cli = GitCli::new(temp_dir.path());
        cli.run(&["init", "--quiet"]).unwrap();

        let err = cli
            .run(&["rev-parse", "-q", "--verify", "refs/stash"])
            .unwrap_err();
        match err {
            GitError::Failed { code, .. } => assert_eq!(code, Some(1)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
