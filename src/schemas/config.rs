//! # Configuration Schema
//!
//! protog is configured through a flat map of tool name to version, plus the location of the
//! proto includes working directory. Values can come from a YAML file, from environment
//! variables, or be supplied directly by a program embedding protog.
//!
//! ```yaml
//! # protog.yaml
//! includes_dir: build/proto-includes
//! versions:
//!   protoc: 3.20.1
//!   protoc-gen-go: 1.28.1
//!   golang: 1.18.3
//! ```
//!
//! An empty or missing version means "resolve automatically". Versions that YAML would read
//! as a number (`1.20`) must be quoted.

use crate::error::{ProtogError, Result};
use crate::libs::utilities::path_helpers::expand_path;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Tool name to explicit version. Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Versions(BTreeMap<String, String>);

impl Versions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the version for a tool, builder style.
    pub fn with(mut self, tool: &str, version: &str) -> Self {
        self.set(tool, version);
        self
    }

    pub fn set(&mut self, tool: &str, version: &str) {
        self.0.insert(tool.to_string(), version.trim().to_string());
    }

    /// The explicit version for `tool`, or `""` when it should be resolved automatically.
    pub fn get(&self, tool: &str) -> &str {
        self.0.get(tool).map(String::as_str).unwrap_or("")
    }

    /// Overlays non-empty entries of `other` on top of `self`.
    pub fn merge(&mut self, other: &Versions) {
        for (tool, version) in &other.0 {
            if !version.is_empty() {
                self.0.insert(tool.clone(), version.clone());
            }
        }
    }

    /// Reads `<TOOL>_VERSION` variables for every tool in `tools` through `lookup`.
    pub fn from_env<F>(tools: &[&str], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut versions = Self::new();
        for tool in tools {
            for var in env_var_names(tool) {
                if let Some(value) = lookup(&var).filter(|v| !v.trim().is_empty()) {
                    versions.set(tool, &value);
                    break;
                }
            }
        }
        versions
    }
}

/// Environment variable names consulted for a tool, most specific first.
///
/// The canonical name is the tool name in upper snake case followed by `_VERSION`.
/// A few tools also accept the names they were historically configured with.
pub fn env_var_names(tool: &str) -> Vec<String> {
    let mut names = vec![format!("{}_VERSION", tool.to_uppercase().replace('-', "_"))];
    let legacy = match tool {
        "golang" => Some("GO_VERSION"),
        "ts-protoc-gen" => Some("PROTOC_TS_GEN_VERSION"),
        "protoc-gen-gogofast" => Some("PROTOC_GEN_GOGO_FAST_VERSION"),
        _ => None,
    };
    names.extend(legacy.map(str::to_string));
    names
}

/// Runtime configuration for a protog invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub versions: Versions,
    /// Where fetched proto dependencies are placed. `None` selects the default for the caller.
    pub includes_dir: Option<PathBuf>,
    /// Overrides the tool cache root (`<user cache dir>/org.curioswitch.protog`).
    pub cache_dir: Option<PathBuf>,
}

// On-disk shape of `protog.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    includes_dir: Option<String>,
    #[serde(default)]
    versions: BTreeMap<String, serde_yaml::Value>,
}

impl Config {
    /// Parses a YAML configuration document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(text)
            .map_err(|e| ProtogError::Config(format!("invalid configuration: {e}")))?;
        let includes_dir = file.includes_dir.as_deref().map(expand_path).transpose()?;

        let mut versions = Versions::new();
        for (tool, value) in file.versions {
            let version = match value {
                serde_yaml::Value::String(s) => s,
                // `1.20` parses as a float and would come back as `1.2`.
                serde_yaml::Value::Number(_) => {
                    return Err(ProtogError::Config(format!(
                        "version for {tool} must be quoted, e.g. \"1.20\""
                    )));
                }
                serde_yaml::Value::Null => String::new(),
                other => {
                    return Err(ProtogError::Config(format!(
                        "version for {tool} must be a string, got {other:?}"
                    )));
                }
            };
            versions.set(&tool, &version);
        }

        Ok(Self {
            versions,
            includes_dir,
            cache_dir: None,
        })
    }

    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ProtogError::io(format!("read config {}", path.display()), e))?;
        Self::from_yaml(&text)
    }
}
