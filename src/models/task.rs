//! Test task descriptors
//!
//! Host-side view of a test task: the settings this plugin copies from the
//! default task and the filters and edges it adds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind string of test tasks
pub const TEST_KIND: &str = "test";

/// Retry settings of a task (test-retry capability)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub fail_on_passed_after_retry: bool,
    #[serde(default)]
    pub max_failures: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_max_failures(mut self, max_failures: u32) -> Self {
        self.max_failures = max_failures;
        self
    }

    pub fn fail_on_passed_after_retry(mut self, fail: bool) -> Self {
        self.fail_on_passed_after_retry = fail;
        self
    }
}

/// A task of the host project
///
/// Only tasks whose `kind` is [`TEST_KIND`] carry meaningful test settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTask {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ignore_failures: bool,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jvm_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heap_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_heap_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel_forks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_every: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub includes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub excludes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,
}

fn default_kind() -> String {
    TEST_KIND.to_string()
}

impl TestTask {
    /// New test task with host defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: default_kind(),
            group: None,
            description: None,
            ignore_failures: false,
            fail_fast: false,
            jvm_args: Vec::new(),
            max_heap_size: None,
            min_heap_size: None,
            timeout_secs: None,
            max_parallel_forks: None,
            fork_every: None,
            retry: None,
            includes: BTreeSet::new(),
            excludes: BTreeSet::new(),
            depends_on: BTreeSet::new(),
        }
    }

    /// Task of some other kind (`exec`, `jar`, ...)
    pub fn other(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::new(name)
        }
    }

    pub fn is_test(&self) -> bool {
        self.kind == TEST_KIND
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_jvm_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jvm_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_heap(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min_heap_size = min.map(str::to_string);
        self.max_heap_size = max.map(str::to_string);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_max_parallel_forks(mut self, forks: usize) -> Self {
        self.max_parallel_forks = Some(forks);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn ignore_failures(mut self, ignore: bool) -> Self {
        self.ignore_failures = ignore;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}
