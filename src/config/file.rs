//! Project-level configuration file
//!
//! Handles finding and loading the project's key/value file. Java-style
//! `.properties` files are read line by line; YAML and JSON documents are
//! flattened into dotted keys.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::source::{MapSource, SourceRank};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./gradle.properties",
    "./run-tests-separate.yaml",
    "./run-tests-separate.yml",
    "./run-tests-separate.json",
    "~/.config/run-tests-separate/config.yaml",
];

/// Key/value pairs read from the project-level config file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectProperties {
    /// File the values were read from
    pub path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl ProjectProperties {
    /// Find a configuration file in the standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from the first standard location, or nothing
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let values = match file_format(path) {
            FileFormat::Yaml => {
                let document: serde_yaml::Value = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;
                flatten(&document)
            }
            FileFormat::Json => {
                let document: serde_yaml::Value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?;
                flatten(&document)
            }
            FileFormat::Properties => parse_properties(&content),
        };

        debug!("Loaded {} entries from {}", values.len(), path.display());

        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Project-config layer for resolution
    pub fn into_source(self) -> MapSource {
        MapSource::from_pairs(SourceRank::ProjectConfig, self.values)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileFormat {
    Properties,
    Yaml,
    Json,
}

fn file_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        _ => FileFormat::Properties,
    }
}

/// Parse Java-style properties: `key=value`, `key: value` or `key value`,
/// `#`/`!` comments, trailing `\` continues a line
pub fn parse_properties(content: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    let mut logical = String::new();

    for line in content.lines() {
        let line = if logical.is_empty() {
            line.trim_start()
        } else {
            line.trim()
        };
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if let Some(continued) = line.strip_suffix('\\') {
            logical.push_str(continued);
            continue;
        }
        logical.push_str(line);

        let entry = std::mem::take(&mut logical);
        if let Some((key, value)) = split_entry(&entry) {
            values.insert(key, value);
        }
    }

    if let Some((key, value)) = split_entry(&logical) {
        values.insert(key, value);
    }

    values
}

fn split_entry(entry: &str) -> Option<(String, String)> {
    let entry = entry.trim_start();
    if entry.is_empty() {
        return None;
    }

    let separator = entry.find(|c: char| c == '=' || c == ':' || c.is_whitespace());
    let (key, value) = match separator {
        Some(index) => {
            let rest = entry[index..].trim_start();
            let rest = rest
                .strip_prefix('=')
                .or_else(|| rest.strip_prefix(':'))
                .unwrap_or(rest);
            (&entry[..index], rest.trim_start())
        }
        None => (entry, ""),
    };

    Some((key.to_string(), value.trim_end().to_string()))
}

/// Flatten nested mappings into dotted keys; sequences become comma lists
fn flatten(document: &serde_yaml::Value) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    flatten_into(String::new(), document, &mut values);
    values
}

pub(crate) fn flatten_into(
    prefix: String,
    value: &serde_yaml::Value,
    out: &mut BTreeMap<String, String>,
) {
    use serde_yaml::Value;

    match value {
        Value::Mapping(mapping) => {
            for (key, child) in mapping {
                let Some(key) = scalar_text(key) else {
                    continue;
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(path, child, out);
            }
        }
        Value::Sequence(items) => {
            let joined = items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix, joined);
        }
        Value::Tagged(tagged) => flatten_into(prefix, &tagged.value, out),
        scalar => {
            if !prefix.is_empty() {
                out.insert(prefix, scalar_text(scalar).unwrap_or_default());
            }
        }
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use tempfile::tempdir;

    #[test]
    fn test_parse_properties() {
        let content = "\
# comment
! also a comment
plugins.runtestsseparatejvm.listOfTests.sequential = FooTest, \\
    BarTest
plugins.runtestsseparatejvm.timeout.parallel: 10
plugins.runtestsseparatejvm.inheritTestConfiguration true
emptyKey=
";
        let values = parse_properties(content);
        assert_eq!(
            values.get("plugins.runtestsseparatejvm.listOfTests.sequential"),
            Some(&"FooTest, BarTest".to_string())
        );
        assert_eq!(
            values.get("plugins.runtestsseparatejvm.timeout.parallel"),
            Some(&"10".to_string())
        );
        assert_eq!(
            values.get("plugins.runtestsseparatejvm.inheritTestConfiguration"),
            Some(&"true".to_string())
        );
        assert_eq!(values.get("emptyKey"), Some(&String::new()));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_load_properties_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gradle.properties");
        std::fs::write(
            &path,
            "plugins.runtestsseparatejvm.listOfTests.parallel=A,B\n",
        )
        .unwrap();

        let loaded = ProjectProperties::load(&path).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(
            loaded.get("plugins.runtestsseparatejvm.listOfTests.parallel"),
            Some("A,B")
        );

        let source = loaded.into_source();
        assert_eq!(source.rank(), SourceRank::ProjectConfig);
        assert!(source.contains("plugins.runtestsseparatejvm.listOfTests.parallel"));
    }

    #[test]
    fn test_load_nested_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run-tests-separate.yaml");
        std::fs::write(
            &path,
            "plugins:\n  runtestsseparatejvm:\n    listOfTests:\n      sequential: [SlowTest, DbTest]\n    timeout:\n      sequential: 20\n    inheritTestConfiguration: true\n",
        )
        .unwrap();

        let loaded = ProjectProperties::load(&path).unwrap();
        assert_eq!(
            loaded.get("plugins.runtestsseparatejvm.listOfTests.sequential"),
            Some("SlowTest,DbTest")
        );
        assert_eq!(
            loaded.get("plugins.runtestsseparatejvm.timeout.sequential"),
            Some("20")
        );
        assert_eq!(
            loaded.get("plugins.runtestsseparatejvm.inheritTestConfiguration"),
            Some("true")
        );
    }

    #[test]
    fn test_load_flat_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run-tests-separate.json");
        std::fs::write(
            &path,
            r#"{"plugins.runtestsseparatejvm.listOfTests.parallel": "X,Y", "plugins.runtestsseparatejvm.timeout.parallel": 4}"#,
        )
        .unwrap();

        let loaded = ProjectProperties::load(&path).unwrap();
        assert_eq!(
            loaded.get("plugins.runtestsseparatejvm.listOfTests.parallel"),
            Some("X,Y")
        );
        assert_eq!(
            loaded.get("plugins.runtestsseparatejvm.timeout.parallel"),
            Some("4")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ProjectProperties::load(dir.path().join("absent.properties")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path("./gradle.properties");
        assert_eq!(path, PathBuf::from("./gradle.properties"));
    }
}
