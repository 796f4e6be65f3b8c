use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com";
pub const DEFAULT_API_VERSION: &str = "beta";
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Optional defaults read from `<config dir>/assignmap/config.toml`.
/// Command line flags win over anything set here.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub graph_url: Option<String>,
    pub api_version: Option<String>,
    pub groups: Vec<String>,
    pub categories: Vec<String>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
    /// Retries for throttled (429) and gateway (502/503/504) responses
    pub max_retries: Option<u32>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Could not read {}", config_path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push("assignmap");
        path.push("config.toml");
        Ok(path)
    }

    /// Group names from the command line first, then the file, without repeats
    pub fn merge_groups(&self, from_cli: &[String]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in from_cli.iter().chain(self.groups.iter()) {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}
