//! Configuration module
//!
//! Gathers the plugin's keys from layered sources and resolves them into a
//! validated [`ResolvedConfiguration`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

pub(crate) mod file;
pub mod keys;
mod resolver;
mod source;

pub use file::ProjectProperties;
pub use keys::{ConfigKey, DISABLE_DEPENDENCIES_KEY, KEY_PREFIX};
pub use resolver::{resolve, Advisory, HostCapabilities, Resolution};
pub(crate) use resolver::parse_flag;
pub use source::{
    parse_define, ConfigSource, EnvSource, LayeredSources, MapSource, RawConfigValue, SourceRank,
};

/// The two execution units test classes can be assigned to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Sequential,
    Parallel,
}

impl Partition {
    pub fn all() -> [Partition; 2] {
        [Partition::Sequential, Partition::Parallel]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Partition::Sequential => "sequential",
            Partition::Parallel => "parallel",
        }
    }

    /// Key holding this partition's class list
    pub fn list_key(&self) -> ConfigKey {
        match self {
            Partition::Sequential => ConfigKey::SequentialClasses,
            Partition::Parallel => ConfigKey::ParallelClasses,
        }
    }

    /// Key holding this partition's timeout
    pub fn timeout_key(&self) -> ConfigKey {
        match self {
            Partition::Sequential => ConfigKey::SequentialTimeout,
            Partition::Parallel => ConfigKey::ParallelTimeout,
        }
    }

    /// Name of the test task created for this partition
    pub fn task_name(&self) -> &'static str {
        match self {
            Partition::Sequential => "testSeparateJVMSequentially",
            Partition::Parallel => "testSeparateJVMInParallel",
        }
    }

    pub fn task_description(&self) -> &'static str {
        match self {
            Partition::Sequential => {
                "Run test classes in a separate process each, one process at a time"
            }
            Partition::Parallel => {
                "Run test classes in a separate process each, several processes at a time"
            }
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated plugin configuration
///
/// At least one class set is present and non-empty, and the two sets never
/// share an identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    /// Classes run one forked process at a time
    pub sequential_classes: Option<BTreeSet<String>>,

    /// Classes run in forked processes concurrently
    pub parallel_classes: Option<BTreeSet<String>>,

    /// Copy settings from the project's default test task
    pub inherit_base_configuration: bool,

    /// Copy the default test task's retry policy
    pub inherit_retry_configuration: bool,

    /// Sequential task timeout in minutes
    pub sequential_timeout_minutes: Option<u64>,

    /// Parallel task timeout in minutes
    pub parallel_timeout_minutes: Option<u64>,
}

impl ResolvedConfiguration {
    /// Class set of a partition, if configured
    pub fn classes(&self, partition: Partition) -> Option<&BTreeSet<String>> {
        match partition {
            Partition::Sequential => self.sequential_classes.as_ref(),
            Partition::Parallel => self.parallel_classes.as_ref(),
        }
    }

    pub fn timeout_minutes(&self, partition: Partition) -> Option<u64> {
        match partition {
            Partition::Sequential => self.sequential_timeout_minutes,
            Partition::Parallel => self.parallel_timeout_minutes,
        }
    }

    /// Timeout of a partition as a duration
    pub fn timeout(&self, partition: Partition) -> Option<Duration> {
        self.timeout_minutes(partition)
            .map(|minutes| Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// Partitions that have a class list
    pub fn partitions(&self) -> Vec<Partition> {
        Partition::all()
            .into_iter()
            .filter(|p| self.classes(*p).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = ResolvedConfiguration::default();
        assert!(!config.inherit_base_configuration);
        assert!(!config.inherit_retry_configuration);
        assert!(config.partitions().is_empty());
    }

    #[test]
    fn test_partition_accessors() {
        let config = ResolvedConfiguration {
            parallel_classes: Some(["FastTest".to_string()].into()),
            parallel_timeout_minutes: Some(5),
            ..Default::default()
        };

        assert_eq!(config.partitions(), vec![Partition::Parallel]);
        assert!(config.classes(Partition::Sequential).is_none());
        assert_eq!(
            config.timeout(Partition::Parallel),
            Some(Duration::from_secs(300))
        );
        assert_eq!(config.timeout(Partition::Sequential), None);
    }

    #[test]
    fn test_partition_keys() {
        assert_eq!(Partition::Sequential.list_key(), ConfigKey::SequentialClasses);
        assert_eq!(Partition::Parallel.timeout_key(), ConfigKey::ParallelTimeout);
        assert_ne!(Partition::Sequential.task_name(), Partition::Parallel.task_name());
    }
}
