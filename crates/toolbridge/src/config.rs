//! Bridge configuration: defaults, config file, environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

pub const CONFIG_DIR: &str = ".toolbridge";
pub const CONFIG_FILENAME: &str = "bridge.json";

/// Runtime configuration for the bridge.
///
/// Path-valued fields accept a leading `~/` which is expanded against the
/// user's home directory after all override layers are applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Directories under which run working-directories must resolve.
    pub allowlisted_roots: Vec<String>,
    /// Environment variable names passed through to child processes.
    pub env_allowlist: Vec<String>,
    /// Hard deadline for a single run, in milliseconds.
    pub max_runtime_ms: u64,
    /// Root of the on-disk tool registry.
    pub registry_dir: String,
    /// Root of the per-run audit records.
    pub runs_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:18789".to_string(),
            allowlisted_roots: Vec::new(),
            env_allowlist: ["PATH", "HOME", "USER", "SHELL", "TERM"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_runtime_ms: 600_000,
            registry_dir: "~/.toolbridge/registry".to_string(),
            runs_dir: "~/.toolbridge/runs".to_string(),
        }
    }
}

impl Config {
    /// Load the effective configuration: `~/.toolbridge/bridge.json` when
    /// present, then `TOOLBRIDGE_*` environment overrides, then `~`
    /// expansion. A missing file yields the defaults; a malformed file
    /// fails closed.
    pub fn load() -> BridgeResult<Self> {
        let mut config = match dirs::home_dir() {
            Some(home) => {
                let path = home.join(CONFIG_DIR).join(CONFIG_FILENAME);
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.expand_paths();
        Ok(config)
    }

    /// Load configuration from an explicit file path, without the override
    /// and expansion layers of [`Config::load`].
    pub fn load_from(path: &Path) -> BridgeResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|error| {
            BridgeError::Config(format!(
                "failed to read config {}: {error}",
                path.display()
            ))
        })?;
        serde_json::from_str(&data).map_err(|error| {
            BridgeError::Config(format!(
                "failed to parse config {}: {error}",
                path.display()
            ))
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("TOOLBRIDGE_LISTEN_ADDR") {
            if !addr.is_empty() {
                self.listen_addr = addr;
            }
        }
        if let Ok(dir) = std::env::var("TOOLBRIDGE_REGISTRY_DIR") {
            if !dir.is_empty() {
                self.registry_dir = dir;
            }
        }
        if let Ok(dir) = std::env::var("TOOLBRIDGE_RUNS_DIR") {
            if !dir.is_empty() {
                self.runs_dir = dir;
            }
        }
    }

    fn expand_paths(&mut self) {
        self.registry_dir = expand_home(&self.registry_dir);
        self.runs_dir = expand_home(&self.runs_dir);
        for root in &mut self.allowlisted_roots {
            *root = expand_home(root);
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        PathBuf::from(&self.registry_dir)
    }

    pub fn runs_path(&self) -> PathBuf {
        PathBuf::from(&self.runs_dir)
    }
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.listen_addr, "127.0.0.1:18789");
        assert!(config.allowlisted_roots.is_empty());
        assert_eq!(
            config.env_allowlist,
            vec!["PATH", "HOME", "USER", "SHELL", "TERM"]
        );
        assert_eq!(config.max_runtime_ms, 600_000);
    }

    #[test]
    fn load_from_reads_partial_file_over_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"{"listen_addr":"127.0.0.1:0","allowlisted_roots":["/srv/work"],"max_runtime_ms":250}"#,
        )
        .expect("write config");

        let config = Config::load_from(&path).expect("load config");
        assert_eq!(config.listen_addr, "127.0.0.1:0");
        assert_eq!(config.allowlisted_roots, vec!["/srv/work"]);
        assert_eq!(config.max_runtime_ms, 250);
        // Untouched fields keep their defaults.
        assert_eq!(config.env_allowlist.len(), 5);
    }

    #[test]
    fn malformed_file_fails_closed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "{not json").expect("write config");

        let err = Config::load_from(&path).expect_err("expected config error");
        match err {
            BridgeError::Config(_) => {}
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn expand_home_rewrites_leading_tilde() {
        let expanded = expand_home("~/registry");
        assert!(!expanded.starts_with("~/"));
        assert!(expanded.ends_with("registry"));
        // Non-tilde paths pass through untouched.
        assert_eq!(expand_home("/abs/path"), "/abs/path");
        assert_eq!(expand_home("relative/path"), "relative/path");
    }

    #[test]
    fn env_overrides_take_precedence() {
        std::env::set_var("TOOLBRIDGE_LISTEN_ADDR", "127.0.0.1:19999");
        std::env::set_var("TOOLBRIDGE_REGISTRY_DIR", "/srv/registry");
        std::env::set_var("TOOLBRIDGE_RUNS_DIR", "/srv/runs");

        let mut config = Config::default();
        config.apply_env_overrides();
        config.expand_paths();

        assert_eq!(config.listen_addr, "127.0.0.1:19999");
        assert_eq!(config.registry_dir, "/srv/registry");
        assert_eq!(config.runs_dir, "/srv/runs");

        std::env::remove_var("TOOLBRIDGE_LISTEN_ADDR");
        std::env::remove_var("TOOLBRIDGE_REGISTRY_DIR");
        std::env::remove_var("TOOLBRIDGE_RUNS_DIR");
    }
}
