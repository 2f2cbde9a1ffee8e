//! Layered configuration sources
//!
//! Values come from three layers queried in a fixed order: the project-level
//! config file, process-wide system properties (`-D key=value`) and the
//! process environment. The first layer holding a key wins.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt;

use super::keys::{self, DISABLE_DEPENDENCIES_KEY};

/// Provenance of a raw value, in precedence order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRank {
    ProjectConfig,
    SystemProperty,
    Environment,
}

impl SourceRank {
    pub fn name(&self) -> &'static str {
        match self {
            SourceRank::ProjectConfig => "project config",
            SourceRank::SystemProperty => "system property",
            SourceRank::Environment => "environment",
        }
    }
}

impl fmt::Display for SourceRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw string value together with the layer it came from
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RawConfigValue {
    pub value: String,
    pub rank: SourceRank,
}

/// Read-only key/value snapshot
pub trait ConfigSource: fmt::Debug {
    /// Layer this source represents
    fn rank(&self) -> SourceRank;

    /// Raw value stored under `key`
    fn get(&self, key: &str) -> Option<&str>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Map-backed source used for project config and system properties
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapSource {
    rank: SourceRank,
    values: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new(rank: SourceRank) -> Self {
        Self {
            rank,
            values: BTreeMap::new(),
        }
    }

    /// Empty project-level config
    pub fn project() -> Self {
        Self::new(SourceRank::ProjectConfig)
    }

    /// Empty system property table
    pub fn properties() -> Self {
        Self::new(SourceRank::SystemProperty)
    }

    /// Build from key/value pairs
    pub fn from_pairs<K, V>(rank: SourceRank, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rank,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Copy every entry of `other` over this map
    pub fn extend(&mut self, other: &MapSource) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for MapSource {
    fn rank(&self) -> SourceRank {
        self.rank
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Snapshot of the process environment
///
/// Lookups try the exact dotted key first, then its upper-case underscore
/// spelling (`PLUGINS_RUNTESTSSEPARATEJVM_TIMEOUT_PARALLEL`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Capture the current process environment
    pub fn snapshot() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build from explicit variables (useful for testing)
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl ConfigSource for EnvSource {
    fn rank(&self) -> SourceRank {
        SourceRank::Environment
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .or_else(|| self.vars.get(&keys::env_name(key)))
            .map(String::as_str)
    }
}

/// The three layers in precedence order
#[derive(Debug)]
pub struct LayeredSources {
    project: Box<dyn ConfigSource>,
    properties: Box<dyn ConfigSource>,
    environment: Box<dyn ConfigSource>,
}

impl LayeredSources {
    pub fn new(
        project: impl ConfigSource + 'static,
        properties: impl ConfigSource + 'static,
        environment: impl ConfigSource + 'static,
    ) -> Self {
        Self {
            project: Box::new(project),
            properties: Box::new(properties),
            environment: Box::new(environment),
        }
    }

    /// Project config and system properties only, empty environment
    pub fn without_environment(
        project: impl ConfigSource + 'static,
        properties: impl ConfigSource + 'static,
    ) -> Self {
        Self::new(project, properties, EnvSource::default())
    }

    /// Layers in lookup order
    pub fn layers(&self) -> [&dyn ConfigSource; 3] {
        [
            self.project.as_ref(),
            self.properties.as_ref(),
            self.environment.as_ref(),
        ]
    }

    /// First value found for `key`, with its provenance
    pub fn lookup(&self, key: &str) -> Option<RawConfigValue> {
        self.layers().into_iter().find_map(|layer| {
            layer.get(key).map(|value| RawConfigValue {
                value: value.to_string(),
                rank: layer.rank(),
            })
        })
    }

    /// Whether the `test` dependency edges are switched off
    ///
    /// Only system properties and the environment are consulted; the value
    /// is ignored.
    pub fn dependencies_disabled(&self) -> bool {
        self.properties.contains(DISABLE_DEPENDENCIES_KEY)
            || self.environment.contains(DISABLE_DEPENDENCIES_KEY)
    }
}

/// Parse a `key=value` system property definition
pub fn parse_define(define: &str) -> Option<(String, String)> {
    let (key, value) = define.split_once('=').unwrap_or((define, ""));
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENTIAL: &str = "plugins.runtestsseparatejvm.listOfTests.sequential";

    /// Restores a variable on drop
    struct EnvGuard {
        key: String,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let previous = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                previous,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_project_config_wins() {
        let sources = LayeredSources::new(
            MapSource::project().with(SEQUENTIAL, "FromProject"),
            MapSource::properties().with(SEQUENTIAL, "FromProperty"),
            EnvSource::from_vars([(SEQUENTIAL, "FromEnv")]),
        );

        let raw = sources.lookup(SEQUENTIAL).unwrap();
        assert_eq!(raw.value, "FromProject");
        assert_eq!(raw.rank, SourceRank::ProjectConfig);
    }

    #[test]
    fn test_property_wins_over_environment() {
        let sources = LayeredSources::new(
            MapSource::project(),
            MapSource::properties().with(SEQUENTIAL, "FromProperty"),
            EnvSource::from_vars([(SEQUENTIAL, "FromEnv")]),
        );

        let raw = sources.lookup(SEQUENTIAL).unwrap();
        assert_eq!(raw.value, "FromProperty");
        assert_eq!(raw.rank, SourceRank::SystemProperty);
    }

    #[test]
    fn test_environment_fallback() {
        let sources = LayeredSources::new(
            MapSource::project(),
            MapSource::properties(),
            EnvSource::from_vars([("PLUGINS_RUNTESTSSEPARATEJVM_LISTOFTESTS_SEQUENTIAL", "Shell")]),
        );

        let raw = sources.lookup(SEQUENTIAL).unwrap();
        assert_eq!(raw.value, "Shell");
        assert_eq!(raw.rank, SourceRank::Environment);
        assert!(sources.lookup("plugins.runtestsseparatejvm.listOfTests.parallel").is_none());
    }

    #[test]
    fn test_exact_env_key_preferred() {
        let env = EnvSource::from_vars([
            (SEQUENTIAL, "Dotted"),
            ("PLUGINS_RUNTESTSSEPARATEJVM_LISTOFTESTS_SEQUENTIAL", "Shell"),
        ]);
        assert_eq!(env.get(SEQUENTIAL), Some("Dotted"));
    }

    #[test]
    fn test_dependencies_disabled() {
        let project_only = LayeredSources::without_environment(
            MapSource::project().with(DISABLE_DEPENDENCIES_KEY, "true"),
            MapSource::properties(),
        );
        assert!(!project_only.dependencies_disabled());

        let property = LayeredSources::without_environment(
            MapSource::project(),
            MapSource::properties().with(DISABLE_DEPENDENCIES_KEY, ""),
        );
        assert!(property.dependencies_disabled());

        let environment = LayeredSources::new(
            MapSource::project(),
            MapSource::properties(),
            EnvSource::from_vars([(DISABLE_DEPENDENCIES_KEY, "false")]),
        );
        assert!(environment.dependencies_disabled());
    }

    #[test]
    fn test_env_snapshot() {
        let key = "plugins.runtestsseparatejvm.snapshot.probe";
        let _guard = EnvGuard::set(key, "present");

        let snapshot = EnvSource::snapshot();
        assert_eq!(snapshot.get(key), Some("present"));
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("a.b=c=d"),
            Some(("a.b".to_string(), "c=d".to_string()))
        );
        assert_eq!(
            parse_define("disableTestDependencies"),
            Some(("disableTestDependencies".to_string(), String::new()))
        );
        assert_eq!(parse_define("=value"), None);
    }
}
