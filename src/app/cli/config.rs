//! TOML configuration file loading
//!
//! `podext.toml` holds the same global settings as the command line plus a
//! `[plugins.<name>]` table per plugin. Command line values win.

use super::args::{split_names, Args};
use crate::plugin::api::{DiscoveryConfig, LoaderConfig};
use serde::{Deserialize, Deserializer};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "podext.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(match self {
            ConfigError::NotFound { .. } => "Configuration file not found",
            ConfigError::Read { .. } => "Cannot read configuration file",
            ConfigError::Parse { .. } => "Invalid configuration file",
        })
    }
}

/// Contents of `podext.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PodextConfig {
    pub plugin_dir: Option<PathBuf>,
    #[serde(deserialize_with = "string_or_list")]
    pub exclude_plugin: Vec<String>,
    pub color: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub plugins: LoaderConfig,
}

// exclude-plugin = "a,b" or exclude-plugin = ["a", "b"]
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let values = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    };
    Ok(split_names(&values))
}

/// `<config dir>/podext/podext.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("podext").join(CONFIG_FILE_NAME))
}

impl PodextConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly named file, which must exist, or the default file
    /// if there is one. No file at all gives the default configuration.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        log::debug!("Loading configuration from {}", path.display());
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        Self::parse(&content, &path)
    }
}

/// Command line merged over the configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub plugin_dir: Option<PathBuf>,
    pub exclusions: Vec<String>,
    pub use_color: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub plugins: LoaderConfig,
}

impl Settings {
    /// `is_terminal` decides colour when neither source sets it
    pub fn resolve(args: &Args, config: PodextConfig, is_terminal: bool) -> Self {
        let mut exclusions = config.exclude_plugin;
        for name in args.exclusions() {
            if !exclusions.contains(&name) {
                exclusions.push(name);
            }
        }

        Self {
            plugin_dir: args.plugin_dir.clone().or(config.plugin_dir),
            exclusions,
            use_color: args
                .color_override()
                .or(config.color)
                .unwrap_or(is_terminal),
            log_level: args.log_level.clone().or(config.log_level),
            log_format: args.log_format.clone().or(config.log_format),
            log_file: args.log_file.clone().or(config.log_file),
            plugins: config.plugins,
        }
    }

    pub fn from_sources(args: &Args, config: PodextConfig) -> Self {
        Self::resolve(args, config, std::io::stdout().is_terminal())
    }

    /// Discovery settings; without `plugin-dir` the default plugin path is used
    pub fn discovery_config(&self) -> DiscoveryConfig {
        let config = DiscoveryConfig::default().with_excluded(self.exclusions.clone());
        match &self.plugin_dir {
            Some(dir) => config.with_search_path(Some(dir.clone())),
            None => config,
        }
    }
}
