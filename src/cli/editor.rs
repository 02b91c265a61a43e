//! External editor support for writing commit messages.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::message::strip_comments;

/// Splits an editor command line into program and arguments.
pub(crate) fn parse_editor_command(editor: &str) -> (&str, Vec<&str>) {
    let mut parts = editor.split_whitespace();
    let cmd = parts.next().unwrap_or(editor);
    let args: Vec<&str> = parts.collect();
    (cmd, args)
}

/// Builds the text the editor opens with.
pub fn message_template(message: &str, has_staged: bool, include_staged: bool) -> String {
    let mut template = String::new();
    template.push_str(message.trim());
    template.push_str("\n\n");
    template.push_str("# Enter the new message for the current commit. Lines starting\n");
    template.push_str("# with '#' are ignored, and an empty message aborts the rename.\n");
    if has_staged {
        if include_staged {
            template.push_str("#\n# Staged changes will be included in the amended commit.\n");
        } else {
            template.push_str("#\n# Staged changes will be kept out of the amended commit.\n");
        }
    }
    template
}

/// Opens `initial` in `editor` and returns the edited message without comments.
pub fn edit_message(editor: &str, initial: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("RENAME_COMMIT_EDITMSG")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temporary message file")?;
    file.write_all(initial.as_bytes())
        .context("Failed to write temporary message file")?;
    file.flush()
        .context("Failed to write temporary message file")?;

    run_editor(editor, file.path())?;

    let edited = fs::read_to_string(file.path()).context("Failed to read edited message")?;
    Ok(strip_comments(&edited))
}

fn run_editor(editor: &str, path: &Path) -> Result<()> {
    let (editor_cmd, args) = parse_editor_command(editor);
    debug!("Launching editor: {editor}");

    let status = Command::new(editor_cmd)
        .args(args)
        .arg(path)
        .status()
        .with_context(|| {
            format!("Failed to execute editor '{editor}'. Please check that it is available in your PATH.")
        })?;

    if !status.success() {
        bail!("Editor exited with non-zero status: {:?}", status.code());
    }
    Ok(())
}
