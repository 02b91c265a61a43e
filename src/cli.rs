//! CLI interface for rename-commit.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

pub mod amend;
pub mod check;
pub mod editor;
pub mod status;

pub use amend::AmendCommand;
pub use check::CheckCommand;
pub use status::StatusCommand;

/// rename-commit: rewrite the message of the most recent commit.
#[derive(Parser)]
#[command(name = "git-rename-commit")]
#[command(about = "Rename the most recent Git commit", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Amends the HEAD commit with a new message.
    Amend(AmendCommand),
    /// Checks a candidate message against HEAD without amending.
    Check(CheckCommand),
    /// Shows whether HEAD can be renamed right now.
    Status(StatusCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Amend(amend_cmd) => amend_cmd.execute(),
            Commands::Check(check_cmd) => check_cmd.execute(),
            Commands::Status(status_cmd) => status_cmd.execute(),
        }
    }
}

/// Repository selection shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Path inside the repository to operate on.
    #[arg(short = 'C', long = "repo", value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,
}

/// Where the candidate message comes from.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct MessageArgs {
    /// New commit message.
    #[arg(short, long, value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Read the new commit message from a file ("-" for stdin).
    #[arg(short = 'F', long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl MessageArgs {
    /// Returns the message given on the command line or in a file, if any.
    pub fn read(&self) -> Result<Option<String>> {
        if let Some(message) = &self.message {
            return Ok(Some(message.clone()));
        }

        match &self.file {
            Some(path) if path.as_os_str() == "-" => {
                let mut message = String::new();
                io::stdin()
                    .read_to_string(&mut message)
                    .context("Failed to read commit message from stdin")?;
                Ok(Some(message))
            }
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read commit message file: {}", path.display()))
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_and_file_conflict() {
        let result = Cli::try_parse_from([
            "git-rename-commit",
            "amend",
            "-m",
            "Reword",
            "-F",
            "msg.txt",
        ]);
        assert!(result.is_err(), "--message and --file should conflict");
    }

    #[test]
    fn repo_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["git-rename-commit", "status"]).unwrap();
        match cli.command {
            Commands::Status(cmd) => assert_eq!(cmd.repo.repo, PathBuf::from(".")),
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn message_read_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("msg.txt");
        fs::write(&path, "From file\n").unwrap();

        let args = MessageArgs {
            message: None,
            file: Some(path),
        };
        assert_eq!(args.read().unwrap().as_deref(), Some("From file\n"));
    }

    #[test]
    fn no_message_source() {
        assert!(MessageArgs::default().read().unwrap().is_none());
    }

    #[test]
    fn missing_message_file_is_error() {
        let args = MessageArgs {
            message: None,
            file: Some(PathBuf::from("/nonexistent/rename-commit/msg.txt")),
        };
        let err = args.read().unwrap_err();
        assert!(err.to_string().contains("Failed to read commit message file"));
    }
}
