//! Check command — validates a candidate message without amending.

use anyhow::{bail, Result};
use clap::Parser;

use crate::cli::{MessageArgs, RepoArgs};
use crate::data::{self, CheckReport, OutputFormat};
use crate::git::RenameError;
use crate::message::{self, Validator};
use crate::utils::{check_rename_prerequisites, Config};

/// Check command options.
#[derive(Parser)]
pub struct CheckCommand {
    /// Repository selection.
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Candidate message source.
    #[command(flatten)]
    pub message: MessageArgs,

    /// Evaluate as if staged changes were kept out of the amend.
    #[arg(long)]
    pub exclude_staged: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckCommand {
    /// Executes the check command.
    pub fn execute(self) -> Result<()> {
        let Some(candidate) = self.message.read()? else {
            bail!("check requires --message or --file");
        };

        let config = Config::load()?;
        let repo = check_rename_prerequisites(&self.repo.repo, &config.git_program)?;
        let snapshot = repo.snapshot()?;
        let head = snapshot
            .check_renamable()
            .map_err(RenameError::from)?;

        let original = repo.head_message()?;
        let has_staged = repo.staged_files().map(|f| !f.is_empty()).unwrap_or(false);
        let include_staged = !self.exclude_staged;

        let report = self.build_report(
            &Validator::new(config.subject_limit),
            head.short_hash(),
            &original,
            candidate.trim(),
            has_staged,
            include_staged,
        );

        match self.format {
            OutputFormat::Text => print!("{}", report.render_text()),
            OutputFormat::Json => println!("{}", data::to_json(&report)?),
            OutputFormat::Yaml => print!("{}", data::to_yaml(&report)?),
        }

        if report.is_blocked() {
            bail!("Commit message check failed");
        }
        Ok(())
    }

    fn build_report(
        &self,
        validator: &Validator,
        head: &str,
        original: &str,
        candidate: &str,
        has_staged: bool,
        include_staged: bool,
    ) -> CheckReport {
        CheckReport {
            head: head.to_string(),
            original: original.to_string(),
            candidate: candidate.to_string(),
            has_staged,
            include_staged: message::should_include_staged(has_staged, include_staged),
            validation: validator.evaluate(
                candidate,
                original,
                message::toggle_changed(has_staged, include_staged),
            ),
        }
    }
}
