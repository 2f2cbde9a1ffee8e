//! Output formatters for resolution results
//!
//! Provides table, JSON and YAML output formats.

use serde::Serialize;

use crate::config::{ConfigKey, Partition, Resolution, ResolvedConfiguration};
use crate::models::TestTask;
use crate::wiring::WiringPlan;

const RULE: &str = "══════════════════════════════════════════════════════════════";

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a resolution with its advisories
    pub fn format_resolution(&self, resolution: &Resolution) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("\n╔{RULE}╗\n"));
                output.push_str("║  Resolved configuration\n");
                output.push_str(&format!("╠{RULE}╣\n"));
                output.push_str(&self.configuration_rows(&resolution.configuration));
                output.push_str(&self.advisory_rows(resolution));
                output.push_str(&format!("╚{RULE}╝\n"));
                output
            }
            _ => self.serialize(resolution),
        }
    }

    /// Format a wiring plan
    pub fn format_plan(&self, plan: &WiringPlan) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("\n╔{RULE}╗\n"));
                output.push_str("║  Wiring plan\n");
                output.push_str(&format!("╠{RULE}╣\n"));
                output.push_str(&self.configuration_rows(plan.configuration()));
                output.push_str(&self.advisory_rows(&plan.resolution));

                output.push_str(&format!("╠{RULE}╣\n"));
                for task in &plan.tasks {
                    output.push_str(&self.task_rows(task));
                }

                if !plan.exclusions.is_empty() {
                    output.push_str(&format!("╠{RULE}╣\n"));
                    for exclusion in &plan.exclusions {
                        output.push_str(&format!(
                            "║  exclude from {:20} {}\n",
                            exclusion.task,
                            join(&exclusion.classes)
                        ));
                    }
                }

                output.push_str(&format!("╠{RULE}╣\n"));
                if plan.dependencies.is_empty() {
                    output.push_str("║  no dependency edges\n");
                }
                for edge in &plan.dependencies {
                    output.push_str(&format!("║  {} -> {}\n", edge.from, edge.to));
                }
                output.push_str(&format!("╚{RULE}╝\n"));
                output
            }
            _ => self.serialize(plan),
        }
    }

    /// Format a task list (after a plan was applied)
    pub fn format_tasks(&self, tasks: &[TestTask]) -> String {
        match self.format {
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str(&format!("\n╔{RULE}╗\n"));
                output.push_str("║  Project tasks\n");
                output.push_str(&format!("╠{RULE}╣\n"));
                for task in tasks {
                    output.push_str(&self.task_rows(task));
                }
                output.push_str(&format!("╚{RULE}╝\n"));
                output
            }
            _ => self.serialize(&tasks),
        }
    }

    /// Format the recognized keys
    pub fn format_keys(&self) -> String {
        #[derive(Serialize)]
        struct KeyRow {
            key: &'static str,
            env: String,
            value: &'static str,
        }

        let rows: Vec<KeyRow> = ConfigKey::all()
            .into_iter()
            .map(|key| KeyRow {
                key: key.name(),
                env: key.env_name(),
                value: key.value_type(),
            })
            .collect();

        match self.format {
            OutputFormat::Table => {
                let mut output = String::new();
                for row in &rows {
                    output.push_str(&format!("  {:62} {}\n", row.key, row.value));
                    output.push_str(&format!("    env: {}\n", row.env));
                }
                output
            }
            _ => self.serialize(&rows),
        }
    }

    fn configuration_rows(&self, config: &ResolvedConfiguration) -> String {
        let mut output = String::new();
        for partition in Partition::all() {
            let classes = config
                .classes(partition)
                .map(|classes| join(classes))
                .unwrap_or_else(|| "-".to_string());
            let timeout = config
                .timeout_minutes(partition)
                .map(|m| format!("{m} min"))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "║  {:10} classes: {}\n║  {:10} timeout: {}\n",
                partition.name(),
                classes,
                "",
                timeout
            ));
        }
        output.push_str(&format!(
            "║  inherit base: {} | inherit retry: {}\n",
            config.inherit_base_configuration, config.inherit_retry_configuration
        ));
        output
    }

    fn advisory_rows(&self, resolution: &Resolution) -> String {
        let mut output = String::new();
        for advisory in &resolution.advisories {
            let label = if self.colorize {
                "\x1b[33m! WARNING\x1b[0m"
            } else {
                "! WARNING"
            };
            output.push_str(&format!("║  {label} {advisory}\n"));
        }
        output
    }

    fn task_rows(&self, task: &TestTask) -> String {
        let name = if self.colorize {
            format!("\x1b[1m{}\x1b[0m", task.name)
        } else {
            task.name.clone()
        };

        let mut output = format!("║  {} [{}]\n", name, task.group.as_deref().unwrap_or("-"));
        if !task.is_test() {
            return output;
        }

        let forks = task
            .max_parallel_forks
            .map(|f| f.to_string())
            .unwrap_or_else(|| "host default".to_string());
        output.push_str(&format!(
            "║    fork every: {} | max parallel forks: {}\n",
            task.fork_every
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            forks
        ));
        if let Some(secs) = task.timeout_secs {
            output.push_str(&format!("║    timeout: {secs}s\n"));
        }
        if let Some(retry) = &task.retry {
            output.push_str(&format!(
                "║    retry: max {} | max failures {} | fail on pass after retry {}\n",
                retry.max_retries, retry.max_failures, retry.fail_on_passed_after_retry
            ));
        }
        if !task.includes.is_empty() {
            output.push_str(&format!("║    include: {}\n", join(&task.includes)));
        }
        if !task.excludes.is_empty() {
            output.push_str(&format!("║    exclude: {}\n", join(&task.excludes)));
        }
        if !task.depends_on.is_empty() {
            output.push_str(&format!("║    depends on: {}\n", join(&task.depends_on)));
        }
        output
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(value).unwrap_or_default(),
            OutputFormat::Yaml | OutputFormat::Table => {
                serde_yaml::to_string(value).unwrap_or_default()
            }
        }
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Advisory;

    fn resolution() -> Resolution {
        Resolution {
            configuration: ResolvedConfiguration {
                sequential_classes: Some(["com.x.Foo".to_string(), "Bar".to_string()].into()),
                sequential_timeout_minutes: Some(15),
                ..Default::default()
            },
            advisories: vec![Advisory::AmbiguousClassNames {
                partition: Partition::Sequential,
                classes: vec!["com.x.Foo".to_string()],
            }],
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("YML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_table_resolution() {
        let output = ReportFormatter::new(OutputFormat::Table)
            .no_color()
            .format_resolution(&resolution());

        assert!(output.contains("Bar, com.x.Foo"));
        assert!(output.contains("15 min"));
        assert!(output.contains("! WARNING"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_json_resolution() {
        let output = ReportFormatter::new(OutputFormat::Json).format_resolution(&resolution());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(
            value["configuration"]["sequential_timeout_minutes"],
            serde_json::json!(15)
        );
        assert_eq!(
            value["advisories"][0]["kind"],
            serde_json::json!("ambiguous_class_names")
        );
    }

    #[test]
    fn test_keys_listing() {
        let output = ReportFormatter::new(OutputFormat::Table).format_keys();
        for key in ConfigKey::all() {
            assert!(output.contains(key.name()));
            assert!(output.contains(&key.env_name()));
        }
    }
}
