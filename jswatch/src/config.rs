//! Configuration for jswatch
//!
//! Read from `.jswatch.toml` in the watched root (or an explicit `--config`
//! file). Every field has a default, so an absent file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::BackendKind;

/// File name looked up in the watched root
pub const CONFIG_FILE_NAME: &str = ".jswatch.toml";

pub const DEFAULT_SERVICE_URL: &str = "https://closure-compiler.appspot.com/compile";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backends to try, in order
    pub backends: Vec<BackendKind>,
    pub local: LocalConfig,
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backends: vec![BackendKind::Local, BackendKind::Remote],
            local: LocalConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Settings for running the compiler application locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Java launcher, looked up on PATH
    pub java: String,
    /// Closure Compiler jar
    pub jar: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar: default_jar_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: String,
    pub compilation_level: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Resolve the service host before choosing this backend
    pub probe: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            compilation_level: "SIMPLE_OPTIMIZATIONS".to_string(),
            connect_timeout_secs: 10,
            timeout_secs: 120,
            probe: true,
        }
    }
}

/// `<data dir>/jswatch/compiler.jar`, or `compiler.jar` when no data dir exists
pub fn default_jar_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("jswatch"))
        .unwrap_or_default()
        .join("compiler.jar")
}

impl Config {
    /// Load the configuration for a watched root.
    ///
    /// An explicit file must exist; the implicit `.jswatch.toml` is optional.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = root.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Restrict resolution to a single backend
    pub fn only_backend(&mut self, kind: BackendKind) {
        self.backends = vec![kind];
    }
}
