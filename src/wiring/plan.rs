//! Task wiring plan
//!
//! Turns a resolved configuration into the two partition tasks, the exclude
//! filters for every other test task and the dependency edges from the
//! default `test` task.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::config::{
    parse_flag, resolve, ConfigKey, LayeredSources, Partition, Resolution, ResolvedConfiguration,
};
use crate::error::{ConfigError, Result};
use crate::models::{Project, TestTask};

/// Name of the project's default test task
pub const BASE_TASK_NAME: &str = "test";

/// Group used for partition tasks that don't inherit one
pub const VERIFICATION_GROUP: &str = "verification";

/// Exclude filter to add to an existing test task
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub task: String,
    pub classes: BTreeSet<String>,
}

/// `from` must run after `to`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

/// Everything the host has to do to apply the plugin
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WiringPlan {
    pub resolution: Resolution,
    pub tasks: Vec<TestTask>,
    pub exclusions: Vec<Exclusion>,
    pub dependencies: Vec<DependencyEdge>,
}

impl WiringPlan {
    pub fn configuration(&self) -> &ResolvedConfiguration {
        &self.resolution.configuration
    }

    /// Apply the plan to a project descriptor
    ///
    /// Existing tasks with a partition task's name are replaced.
    pub fn apply(&self, project: &mut Project) {
        let new_names: BTreeSet<&str> = self.tasks.iter().map(|t| t.name.as_str()).collect();
        project
            .tasks
            .retain(|task| !new_names.contains(task.name.as_str()));

        for exclusion in &self.exclusions {
            if let Some(task) = project.task_mut(&exclusion.task) {
                task.excludes.extend(exclusion.classes.iter().cloned());
            }
        }

        project.tasks.extend(self.tasks.iter().cloned());

        for edge in &self.dependencies {
            if let Some(task) = project.task_mut(&edge.from) {
                task.depends_on.insert(edge.to.clone());
            }
        }
    }
}

/// Resolve the configuration for `project` and plan the task wiring
pub fn plan(project: &Project, sources: &LayeredSources) -> Result<WiringPlan> {
    if !project.has_java_target() {
        return Err(ConfigError::PluginMisapplied {
            project: project.name.clone(),
        });
    }

    // The base task is checked ahead of list parsing; a missing configuration
    // still takes priority
    let lists_present = Partition::all()
        .iter()
        .any(|p| sources.lookup(p.list_key().name()).is_some());
    if lists_present && parse_flag(sources, ConfigKey::InheritBase) {
        base_task(project, ConfigKey::InheritBase)?;
    }

    let capabilities = project.capabilities();
    let resolution = resolve(sources, capabilities)?;
    let config = &resolution.configuration;

    let copy_retry = config.inherit_retry_configuration && capabilities.retry;
    let base = if config.inherit_base_configuration {
        Some(base_task(project, ConfigKey::InheritBase)?)
    } else if copy_retry {
        Some(base_task(project, ConfigKey::InheritRetry)?)
    } else {
        None
    };

    let mut tasks = Vec::new();
    for partition in config.partitions() {
        let task = partition_task(partition, config, base, copy_retry);
        info!(
            "Registering {} with {} test class(es)",
            task.name,
            task.includes.len()
        );
        tasks.push(task);
    }

    let mut exclusions: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for partition in config.partitions() {
        let Some(classes) = config.classes(partition) else {
            continue;
        };

        for task in project.tasks.iter().filter(|t| t.is_test()) {
            if task.name == partition.task_name() || is_partition_task(&task.name) {
                continue;
            }
            exclusions
                .entry(task.name.clone())
                .or_default()
                .extend(classes.iter().cloned());
        }

        for task in tasks.iter_mut() {
            if task.name != partition.task_name() {
                task.excludes.extend(classes.iter().cloned());
            }
        }
    }

    let mut dependencies = Vec::new();
    if sources.dependencies_disabled() {
        debug!("'{}' test task dependencies disabled", BASE_TASK_NAME);
    } else if project.task(BASE_TASK_NAME).filter(|t| t.is_test()).is_some() {
        dependencies = tasks
            .iter()
            .map(|task| DependencyEdge {
                from: BASE_TASK_NAME.to_string(),
                to: task.name.clone(),
            })
            .collect();
    } else {
        warn!(
            "Project '{}' has no '{}' test task, partition tasks are not wired into it",
            project.name, BASE_TASK_NAME
        );
    }

    Ok(WiringPlan {
        resolution,
        tasks,
        exclusions: exclusions
            .into_iter()
            .map(|(task, classes)| Exclusion { task, classes })
            .collect(),
        dependencies,
    })
}

fn is_partition_task(name: &str) -> bool {
    Partition::all().iter().any(|p| p.task_name() == name)
}

fn base_task<'a>(project: &'a Project, key: ConfigKey) -> Result<&'a TestTask> {
    match project.task(BASE_TASK_NAME) {
        Some(task) if task.is_test() => Ok(task),
        found => Err(ConfigError::BaseTaskMissingOrWrongType {
            key: key.name(),
            project: project.name.clone(),
            task: BASE_TASK_NAME.to_string(),
            found: found.map(|t| t.kind.clone()),
        }),
    }
}

fn partition_task(
    partition: Partition,
    config: &ResolvedConfiguration,
    base: Option<&TestTask>,
    copy_retry: bool,
) -> TestTask {
    let mut task = TestTask::new(partition.task_name());
    task.description = Some(partition.task_description().to_string());
    task.fork_every = Some(1);
    task.includes = config.classes(partition).cloned().unwrap_or_default();

    let own_timeout = config.timeout(partition).map(|d| d.as_secs());

    match base.filter(|_| config.inherit_base_configuration) {
        Some(base) => {
            task.group = base.group.clone();
            task.ignore_failures = base.ignore_failures;
            task.fail_fast = base.fail_fast;
            task.jvm_args = base.jvm_args.clone();
            task.max_heap_size = base.max_heap_size.clone();
            task.min_heap_size = base.min_heap_size.clone();
            task.timeout_secs = own_timeout.or(base.timeout_secs);
            task.max_parallel_forks = base.max_parallel_forks;
        }
        None => {
            task.group = Some(VERIFICATION_GROUP.to_string());
            task.timeout_secs = own_timeout;
        }
    }

    if partition == Partition::Sequential {
        task.max_parallel_forks = Some(1);
    }

    if copy_retry {
        task.retry = Some(base.and_then(|b| b.retry.clone()).unwrap_or_default());
    }

    task
}
