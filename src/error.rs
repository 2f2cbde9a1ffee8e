//! Error types for configuration resolution and task wiring
//!
//! Every failure is fatal to the plugin application. Callers match on
//! [`ConfigError::kind`] to decide how to present it.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Failure kinds surfaced to the invoking build
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PluginMisapplied,
    MissingConfiguration,
    InvalidListEntry,
    InvalidTimeout,
    ClassInBothPartitions,
    BaseTaskMissingOrWrongType,
}

impl ErrorKind {
    /// Process exit code used by the CLI for this kind
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::PluginMisapplied => 10,
            ErrorKind::MissingConfiguration => 11,
            ErrorKind::InvalidListEntry => 12,
            ErrorKind::InvalidTimeout => 13,
            ErrorKind::ClassInBothPartitions => 14,
            ErrorKind::BaseTaskMissingOrWrongType => 15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::PluginMisapplied => "plugin misapplied",
            ErrorKind::MissingConfiguration => "missing configuration",
            ErrorKind::InvalidListEntry => "invalid list entry",
            ErrorKind::InvalidTimeout => "invalid timeout",
            ErrorKind::ClassInBothPartitions => "class in both partitions",
            ErrorKind::BaseTaskMissingOrWrongType => "base task missing or wrong type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration and wiring errors
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Plugin applied to project '{project}' which has no Java test target")]
    PluginMisapplied { project: String },

    #[error("Neither {} provided by project config, system property or environment", quoted(.keys))]
    MissingConfiguration { keys: [&'static str; 2] },

    #[error("'{key}' provided but invalid (empty / blank): {raw:?}")]
    InvalidListEntry { key: &'static str, raw: String },

    #[error("'{key}' provided but invalid (not a positive number of minutes): {raw:?}")]
    InvalidTimeout { key: &'static str, raw: String },

    #[error("The following test classes can not be run both sequentially and in parallel:{}", bullet_list(.classes))]
    ClassInBothPartitions { classes: BTreeSet<String> },

    #[error("'{key}' set to true but project '{project}' has {}", base_task_found(.task, .found))]
    BaseTaskMissingOrWrongType {
        key: &'static str,
        project: String,
        task: String,
        found: Option<String>,
    },
}

impl ConfigError {
    /// Failure kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::PluginMisapplied { .. } => ErrorKind::PluginMisapplied,
            ConfigError::MissingConfiguration { .. } => ErrorKind::MissingConfiguration,
            ConfigError::InvalidListEntry { .. } => ErrorKind::InvalidListEntry,
            ConfigError::InvalidTimeout { .. } => ErrorKind::InvalidTimeout,
            ConfigError::ClassInBothPartitions { .. } => ErrorKind::ClassInBothPartitions,
            ConfigError::BaseTaskMissingOrWrongType { .. } => {
                ErrorKind::BaseTaskMissingOrWrongType
            }
        }
    }

    /// Configuration keys the error is about
    pub fn keys(&self) -> Vec<&'static str> {
        match self {
            ConfigError::MissingConfiguration { keys } => keys.to_vec(),
            ConfigError::InvalidListEntry { key, .. }
            | ConfigError::InvalidTimeout { key, .. }
            | ConfigError::BaseTaskMissingOrWrongType { key, .. } => vec![*key],
            ConfigError::PluginMisapplied { .. } | ConfigError::ClassInBothPartitions { .. } => {
                Vec::new()
            }
        }
    }
}

fn bullet_list(items: &BTreeSet<String>) -> String {
    items.iter().map(|item| format!("\n - {item}")).collect()
}

fn quoted(keys: &[&str]) -> String {
    keys.iter()
        .map(|key| format!("'{key}'"))
        .collect::<Vec<_>>()
        .join(" nor ")
}

fn base_task_found(task: &str, found: &Option<String>) -> String {
    match found {
        Some(kind) => format!("a task named '{task}' of kind '{kind}' instead of a test task"),
        None => format!("no test task named '{task}'"),
    }
}

/// Result type alias for resolution and wiring
pub type Result<T> = std::result::Result<T, ConfigError>;
