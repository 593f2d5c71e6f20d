//! Configuration loading
//!
//! Sources, highest precedence first: command-line flags, environment
//! variables, `.tshirts.toml`, built-in defaults. The result is a plain
//! [`Config`] value built once at startup and handed to whatever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::github::client::DEFAULT_API_URL;

/// Name of the per-project config file
pub const CONFIG_FILE: &str = ".tshirts.toml";

pub const ENV_REPO: &str = "TSHIRTS_REPO";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_API_URL: &str = "GITHUB_API_URL";
pub const ENV_AI_COMMAND: &str = "TSHIRTS_AI_COMMAND";
pub const ENV_MODEL: &str = "TSHIRTS_MODEL";

/// Find a config file by walking up from `start`, then checking the global
/// config directory (`~/.config/tshirts/config.toml` on Linux).
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    let global = dirs::config_dir()?.join("tshirts").join("config.toml");
    global.is_file().then_some(global)
}

// ============================================================================
// File configuration (.tshirts.toml)
// ============================================================================

/// Contents of `.tshirts.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub ai: AiSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubSection {
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AiSection {
    pub command: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Walk up from `start` looking for a config file; absent means defaults
    pub fn discover(start: &Path) -> Result<Self> {
        match find_config_file(start) {
            Some(path) => {
                tracing::debug!("Loading config from: {}", path.display());
                Self::load_from_path(&path)
            }
            None => {
                tracing::debug!("No {} found", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// How to run the LLM subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub command: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            model: "sonnet".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub repo: Option<String>,
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository as given by flag, env or file; not yet validated
    pub repo: Option<String>,
    /// Whether `repo` came from the command line rather than env or file
    pub repo_from_flag: bool,
    pub github_token: Option<String>,
    pub api_url: String,
    pub ai: AiSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: None,
            repo_from_flag: false,
            github_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            ai: AiSettings::default(),
        }
    }
}

impl Config {
    /// Build from the process environment and the config file nearest to
    /// the current directory
    pub fn load(overrides: Overrides) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let file = FileConfig::discover(&cwd)?;
        Ok(Self::from_sources(overrides, |key| std::env::var(key).ok(), file))
    }

    /// Merge the three sources; `lookup` reads environment variables so
    /// tests need not touch the real environment
    pub fn from_sources<E>(overrides: Overrides, lookup: E, file: FileConfig) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AiSettings::default();

        let flag_repo = overrides.repo.filter(|r| !r.trim().is_empty());
        let repo_from_flag = flag_repo.is_some();
        let repo = flag_repo.or_else(|| env(ENV_REPO)).or(file.repo);

        Self {
            repo,
            repo_from_flag,
            github_token: env(ENV_TOKEN),
            api_url: env(ENV_API_URL)
                .or(file.github.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ai: AiSettings {
                command: env(ENV_AI_COMMAND)
                    .or(file.ai.command)
                    .unwrap_or(defaults.command),
                model: env(ENV_MODEL).or(file.ai.model).unwrap_or(defaults.model),
                timeout: file
                    .ai
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            },
        }
    }

    /// The token, or a configuration error naming the variable to set
    pub fn require_token(&self) -> Result<&str> {
        self.github_token
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{ENV_TOKEN} environment variable is required")))
    }
}
