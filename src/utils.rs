//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{check_git_cli, check_git_repository, check_rename_prerequisites};
pub use settings::{Config, Settings};
