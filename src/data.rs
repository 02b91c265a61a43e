//! Data processing and serialization.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod check;
pub mod status;

pub use check::{CheckReport, OutputFormat};
pub use status::{HeadView, StatusView};

/// Serializes `data` as YAML.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}

/// Serializes `data` as pretty-printed JSON.
pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
}
