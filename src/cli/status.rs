//! Status command — shows whether HEAD can be renamed.

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use crate::cli::RepoArgs;
use crate::data::{self, StatusView};
use crate::utils::{check_rename_prerequisites, Config};

/// Status command options.
#[derive(Parser)]
pub struct StatusCommand {
    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,
}

impl StatusCommand {
    /// Executes the status command.
    pub fn execute(self) -> Result<()> {
        let config = Config::load()?;
        let repo = check_rename_prerequisites(&self.repo.repo, &config.git_program)?;
        let snapshot = repo.snapshot()?;

        let staged_files = if snapshot.workdir.is_some() {
            repo.staged_files().unwrap_or_else(|e| {
                warn!("Could not list staged changes: {e}");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let view = StatusView::new(&snapshot, staged_files);
        print!("{}", data::to_yaml(&view)?);
        Ok(())
    }
}
