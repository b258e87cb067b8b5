//! Versioned tool registry loaded from an on-disk tree.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// How a mapped argument renders into command-line tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// A boolean `true` emits the bare flag.
    Flag,
    /// The flag is always followed by a value token.
    Value,
}

/// Declarative mapping from one request argument to command-line tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgMapping {
    /// Key looked up in the request's `args` object.
    pub input: String,
    /// Flag emitted ahead of the value.
    pub flag: String,
    pub kind: ArgKind,
    #[serde(default)]
    pub repeated: bool,
}

/// Subprocess definition: fixed argv template plus argument mappings,
/// applied in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecSpec {
    pub argv: Vec<String>,
    #[serde(default)]
    pub args_mapping: Vec<ArgMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// Declarative description of one vetted command-line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(default)]
    pub json_mode: bool,
    pub exec: ExecSpec,
}

impl ToolSpec {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("missing name".to_string());
        }
        if self.version.is_empty() {
            return Err("missing version".to_string());
        }
        if self.description.is_empty() {
            return Err("missing description".to_string());
        }
        if self.exec.argv.is_empty() {
            return Err("empty exec.argv".to_string());
        }
        Ok(())
    }
}

/// Immutable registry: exactly one spec per tool name, latest version only.
///
/// Built once at startup and shared read-only across handlers; there is no
/// hot reload.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tools: BTreeMap<String, ToolSpec>,
}

impl Registry {
    /// Scan `base/tools/<name>/<version>/tool.json`. Among a tool's version
    /// directories the one sorting last in lexical string order wins;
    /// older versions are never visible. Any malformed or incomplete spec
    /// aborts the whole load. A missing tools root yields an empty
    /// registry.
    pub fn load(base: &Path) -> BridgeResult<Self> {
        let mut tools = BTreeMap::new();
        let tools_dir = base.join("tools");
        let entries = match std::fs::read_dir(&tools_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self { tools });
            }
            Err(error) => {
                return Err(BridgeError::Registry(format!(
                    "failed to scan {}: {error}",
                    tools_dir.display()
                )));
            }
        };

        for entry in entries.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(latest) = latest_version_dir(&entry.path()) else {
                continue;
            };
            let spec_path = entry.path().join(&latest).join("tool.json");
            let data = std::fs::read_to_string(&spec_path).map_err(|error| {
                BridgeError::Registry(format!(
                    "failed to read {}: {error}",
                    spec_path.display()
                ))
            })?;
            let spec: ToolSpec = serde_json::from_str(&data).map_err(|error| {
                BridgeError::Registry(format!(
                    "failed to parse {}: {error}",
                    spec_path.display()
                ))
            })?;
            spec.validate().map_err(|reason| {
                BridgeError::Registry(format!("{}: {reason}", spec_path.display()))
            })?;
            tools.insert(name, spec);
        }

        Ok(Self { tools })
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    /// Registered tool names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Lexically-last version subdirectory of a tool directory, if any.
fn latest_version_dir(tool_dir: &Path) -> Option<String> {
    let entries = std::fs::read_dir(tool_dir).ok()?;
    let mut versions: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    versions.sort();
    versions.pop()
}
