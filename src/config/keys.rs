//! Recognized configuration keys
//!
//! All keys share the `plugins.runtestsseparatejvm.` prefix. The environment
//! source also accepts a shell-friendly spelling (see [`ConfigKey::env_name`]).

use serde::Serialize;
use std::fmt;

/// Prefix shared by every key of this plugin
pub const KEY_PREFIX: &str = "plugins.runtestsseparatejvm.";

/// Presence-only flag (system property or environment) disabling the
/// `test -> partition task` dependency edges
pub const DISABLE_DEPENDENCIES_KEY: &str = "disableTestDependencies";

/// Configuration keys understood by the resolver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKey {
    SequentialClasses,
    ParallelClasses,
    SequentialTimeout,
    ParallelTimeout,
    InheritBase,
    InheritRetry,
}

impl ConfigKey {
    /// Key suffix after [`KEY_PREFIX`]
    pub fn suffix(&self) -> &'static str {
        match self {
            ConfigKey::SequentialClasses => "listOfTests.sequential",
            ConfigKey::ParallelClasses => "listOfTests.parallel",
            ConfigKey::SequentialTimeout => "timeout.sequential",
            ConfigKey::ParallelTimeout => "timeout.parallel",
            ConfigKey::InheritBase => "inheritTestConfiguration",
            ConfigKey::InheritRetry => "inheritTestRetryConfiguration",
        }
    }

    /// Fully qualified key as looked up in every source
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::SequentialClasses => "plugins.runtestsseparatejvm.listOfTests.sequential",
            ConfigKey::ParallelClasses => "plugins.runtestsseparatejvm.listOfTests.parallel",
            ConfigKey::SequentialTimeout => "plugins.runtestsseparatejvm.timeout.sequential",
            ConfigKey::ParallelTimeout => "plugins.runtestsseparatejvm.timeout.parallel",
            ConfigKey::InheritBase => "plugins.runtestsseparatejvm.inheritTestConfiguration",
            ConfigKey::InheritRetry => "plugins.runtestsseparatejvm.inheritTestRetryConfiguration",
        }
    }

    /// Upper-case, underscore separated variant accepted from the environment
    pub fn env_name(&self) -> String {
        env_name(self.name())
    }

    /// Human readable value type
    pub fn value_type(&self) -> &'static str {
        match self {
            ConfigKey::SequentialClasses | ConfigKey::ParallelClasses => "comma-separated classes",
            ConfigKey::SequentialTimeout | ConfigKey::ParallelTimeout => "integer (minutes)",
            ConfigKey::InheritBase | ConfigKey::InheritRetry => "boolean",
        }
    }

    /// Get all keys
    pub fn all() -> Vec<ConfigKey> {
        vec![
            ConfigKey::SequentialClasses,
            ConfigKey::ParallelClasses,
            ConfigKey::SequentialTimeout,
            ConfigKey::ParallelTimeout,
            ConfigKey::InheritBase,
            ConfigKey::InheritRetry,
        ]
    }

    /// Parse from a fully qualified key or its suffix
    pub fn from_name(s: &str) -> Option<ConfigKey> {
        let suffix = s.strip_prefix(KEY_PREFIX).unwrap_or(s);
        Self::all().into_iter().find(|key| key.suffix() == suffix)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shell-friendly spelling of a dotted key
pub fn env_name(key: &str) -> String {
    key.chars()
        .map(|c| if c == '.' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}
