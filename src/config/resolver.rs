//! Configuration resolution
//!
//! A single synchronous pass over the layered sources: class lists are
//! parsed and cross-checked, timeouts parsed, flags read permissively.
//! Anything suspicious but not invalid is reported as an [`Advisory`].

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

use super::keys::ConfigKey;
use super::source::{LayeredSources, RawConfigValue};
use super::{Partition, ResolvedConfiguration};
use crate::error::{ConfigError, Result};

/// Host capabilities the resolver needs to know about
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostCapabilities {
    /// A test-retry capability is present in the build
    pub retry: bool,
}

impl HostCapabilities {
    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }
}

/// Non-fatal findings made during resolution
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Identifiers containing a package separator or wildcard; classes are
    /// matched by simple name, so these may select nothing
    AmbiguousClassNames {
        partition: Partition,
        classes: Vec<String>,
    },

    /// Retry inheritance requested without a retry capability in the build
    InertRetryInheritance { key: &'static str },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::AmbiguousClassNames { partition, classes } => {
                write!(
                    f,
                    "The following test classes provided to be run {} contain a package or \
                     asterisk. This can lead to incomprehensible test results!",
                    match partition {
                        Partition::Sequential => "sequentially",
                        Partition::Parallel => "in parallel",
                    }
                )?;
                for class in classes {
                    write!(f, "\n - {class}")?;
                }
                Ok(())
            }
            Advisory::InertRetryInheritance { key } => write!(
                f,
                "'{key}' provided and set to true but no test-retry capability present in \
                 this build. The setting has no effect."
            ),
        }
    }
}

/// Output of [`resolve`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub configuration: ResolvedConfiguration,
    pub advisories: Vec<Advisory>,
}

/// Resolve and validate the plugin configuration
///
/// Fails fast on the first invalid value. Advisories are logged at WARN and
/// returned alongside the configuration.
pub fn resolve(sources: &LayeredSources, capabilities: HostCapabilities) -> Result<Resolution> {
    let sequential_raw = lookup(sources, Partition::Sequential.list_key());
    let parallel_raw = lookup(sources, Partition::Parallel.list_key());

    if sequential_raw.is_none() && parallel_raw.is_none() {
        return Err(ConfigError::MissingConfiguration {
            keys: [
                Partition::Sequential.list_key().name(),
                Partition::Parallel.list_key().name(),
            ],
        });
    }

    let sequential_classes = sequential_raw
        .map(|raw| parse_list(Partition::Sequential.list_key(), &raw.value))
        .transpose()?;
    let parallel_classes = parallel_raw
        .map(|raw| parse_list(Partition::Parallel.list_key(), &raw.value))
        .transpose()?;

    // Logged as found, ahead of any later failure
    let mut advisories = Vec::new();
    for (partition, classes) in [
        (Partition::Sequential, &sequential_classes),
        (Partition::Parallel, &parallel_classes),
    ] {
        if let Some(advisory) = classes.as_ref().and_then(|c| ambiguous_classes(partition, c)) {
            report(&mut advisories, advisory);
        }
    }

    if let (Some(sequential), Some(parallel)) = (&sequential_classes, &parallel_classes) {
        let conflicts: BTreeSet<String> = sequential.intersection(parallel).cloned().collect();
        if !conflicts.is_empty() {
            return Err(ConfigError::ClassInBothPartitions { classes: conflicts });
        }
    }

    let sequential_timeout_minutes = parse_timeout(sources, Partition::Sequential.timeout_key())?;
    let parallel_timeout_minutes = parse_timeout(sources, Partition::Parallel.timeout_key())?;

    let inherit_base_configuration = parse_flag(sources, ConfigKey::InheritBase);
    let inherit_retry_configuration = parse_flag(sources, ConfigKey::InheritRetry);

    if inherit_retry_configuration && !capabilities.retry {
        report(
            &mut advisories,
            Advisory::InertRetryInheritance {
                key: ConfigKey::InheritRetry.name(),
            },
        );
    }

    Ok(Resolution {
        configuration: ResolvedConfiguration {
            sequential_classes,
            parallel_classes,
            inherit_base_configuration,
            inherit_retry_configuration,
            sequential_timeout_minutes,
            parallel_timeout_minutes,
        },
        advisories,
    })
}

fn report(advisories: &mut Vec<Advisory>, advisory: Advisory) {
    warn!("{}", advisory);
    advisories.push(advisory);
}

fn lookup(sources: &LayeredSources, key: ConfigKey) -> Option<RawConfigValue> {
    let raw = sources.lookup(key.name());
    if let Some(raw) = &raw {
        debug!("{} = {:?} (from {})", key, raw.value, raw.rank);
    }
    raw
}

/// Split a comma-separated class list, dropping whitespace and blank entries
pub(crate) fn split_class_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|token| token.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_list(key: ConfigKey, raw: &str) -> Result<BTreeSet<String>> {
    let classes = split_class_list(raw);
    if classes.is_empty() {
        return Err(ConfigError::InvalidListEntry {
            key: key.name(),
            raw: raw.to_string(),
        });
    }
    Ok(classes)
}

fn ambiguous_classes(partition: Partition, classes: &BTreeSet<String>) -> Option<Advisory> {
    let flagged: Vec<String> = classes
        .iter()
        .filter(|class| class.contains('.') || class.contains('*'))
        .cloned()
        .collect();

    if flagged.is_empty() {
        None
    } else {
        Some(Advisory::AmbiguousClassNames {
            partition,
            classes: flagged,
        })
    }
}

fn parse_timeout(sources: &LayeredSources, key: ConfigKey) -> Result<Option<u64>> {
    let Some(raw) = lookup(sources, key) else {
        return Ok(None);
    };

    match raw.value.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(Some(minutes)),
        _ => Err(ConfigError::InvalidTimeout {
            key: key.name(),
            raw: raw.value,
        }),
    }
}

// Anything other than a case-insensitive "true" reads as false.
pub(crate) fn parse_flag(sources: &LayeredSources, key: ConfigKey) -> bool {
    let Some(raw) = lookup(sources, key) else {
        return false;
    };

    let text = raw.value.trim();
    if text.eq_ignore_ascii_case("true") {
        true
    } else {
        if !text.eq_ignore_ascii_case("false") {
            debug!("{} = {:?} is not a boolean, reading it as false", key, text);
        }
        false
    }
}
