//! Host project descriptor
//!
//! Describes the parts of a build project the plugin looks at: applied
//! plugins, project-level properties and the task set.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::task::TestTask;
use crate::config::{file::flatten_into, HostCapabilities, MapSource, SourceRank};

/// Plugins providing a Java-style test target
pub const JAVA_PLUGINS: &[&str] = &["java", "java-library", "application"];

/// Plugins providing the test-retry capability
pub const RETRY_PLUGINS: &[&str] = &["org.gradle.test-retry", "test-retry"];

/// Build project as seen by the plugin
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub plugins: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub tasks: Vec<TestTask>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a project descriptor (YAML or JSON by extension)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project descriptor: {}", path.display()))?;

        let project: Self = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON project: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML project: {}", path.display()))?
        };

        Ok(project)
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugins.insert(plugin.into());
        self
    }

    pub fn with_task(mut self, task: TestTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn has_java_target(&self) -> bool {
        JAVA_PLUGINS.iter().any(|p| self.plugins.contains(*p))
    }

    pub fn has_retry_capability(&self) -> bool {
        RETRY_PLUGINS.iter().any(|p| self.plugins.contains(*p))
    }

    pub fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::default().with_retry(self.has_retry_capability())
    }

    /// Get task by name
    pub fn task(&self, name: &str) -> Option<&TestTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn task_mut(&mut self, name: &str) -> Option<&mut TestTask> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    /// Project properties as the project-config layer
    pub fn property_source(&self) -> MapSource {
        let mut values = BTreeMap::new();
        for (key, value) in &self.properties {
            flatten_into(key.clone(), value, &mut values);
        }
        MapSource::from_pairs(SourceRank::ProjectConfig, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use tempfile::tempdir;

    #[test]
    fn test_capabilities() {
        let project = Project::new("app").with_plugin("java-library");
        assert!(project.has_java_target());
        assert!(!project.has_retry_capability());

        let project = project.with_plugin("org.gradle.test-retry");
        assert!(project.capabilities().retry);

        assert!(!Project::new("docs").with_plugin("base").has_java_target());
    }

    #[test]
    fn test_load_descriptor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.yaml");
        std::fs::write(
            &path,
            "\
name: service
plugins: [java, org.gradle.test-retry]
properties:
  plugins.runtestsseparatejvm.listOfTests.parallel: [FastTest, OtherTest]
  plugins.runtestsseparatejvm.timeout.parallel: 12
tasks:
  - name: test
    group: verification
    max_parallel_forks: 4
  - name: run
    kind: exec
",
        )
        .unwrap();

        let project = Project::load(&path).unwrap();
        assert_eq!(project.name, "service");
        assert!(project.has_java_target());
        assert!(project.has_retry_capability());
        assert_eq!(project.tasks.len(), 2);
        assert!(project.task("test").unwrap().is_test());
        assert!(!project.task("run").unwrap().is_test());

        let source = project.property_source();
        assert_eq!(
            source.get("plugins.runtestsseparatejvm.listOfTests.parallel"),
            Some("FastTest,OtherTest")
        );
        assert_eq!(
            source.get("plugins.runtestsseparatejvm.timeout.parallel"),
            Some("12")
        );
    }
}
