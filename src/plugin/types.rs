//! Type definitions for the plugin system
//!
//! Descriptors, lifecycle and registry states, discovery results and the
//! environment handed to providers during configuration.

use crate::core::version::get_api_version;
use crate::plugin::schema::ConfigSchema;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use strum_macros::{Display, EnumString};

/// Conventional priority bands. Higher wins; nothing enforces them.
pub mod priority {
    /// Explicit user override
    pub const USER_OVERRIDE: i32 = 150;
    /// Providers shipped with the application
    pub const BUILTIN: i32 = 100;
    /// Providers from separately installed packages
    pub const THIRD_PARTY: i32 = 50;
    pub const EXPERIMENTAL: i32 = 0;
}

/// Static description of a provider type, read once at discovery time
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Contract revision ("major.minor") the provider was written against
    pub api_version: String,
    pub author: Option<String>,
    pub homepage: Option<String>,
    pub config_schema: Option<ConfigSchema>,
    /// Plugins that must be configured before this one, in declaration order
    pub depends_on: Vec<String>,
}

impl PluginInfo {
    /// Descriptor targeting the host's current contract revision
    pub fn new(name: &str, version: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            api_version: get_api_version().to_string(),
            author: None,
            homepage: None,
            config_schema: None,
            depends_on: Vec::new(),
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    pub fn with_homepage(mut self, homepage: &str) -> Self {
        self.homepage = Some(homepage.to_string());
        self
    }

    pub fn with_schema(mut self, schema: ConfigSchema) -> Self {
        self.config_schema = Some(schema);
        self
    }

    /// Declare dependencies; duplicates are dropped, first occurrence wins
    pub fn depends_on(mut self, names: &[&str]) -> Self {
        for name in names {
            if !self.depends_on.iter().any(|d| d == name) {
                self.depends_on.push(name.to_string());
            }
        }
        self
    }
}

/// Registry status of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PluginStatus {
    Loaded,
    Broken,
    Disabled,
}

/// Lifecycle of a provider instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Configured,
    Validated,
    Active,
    CleanedUp,
}

/// Outcome of discovering one provider declaration.
///
/// Exactly one of `plugin` / `error` is set.
pub struct PluginLoadResult<T: ?Sized> {
    pub name: String,
    pub plugin: Option<Box<T>>,
    pub error: Option<String>,
    pub recovery_hint: Option<String>,
    /// Which declaration produced this result
    pub source: String,
}

impl<T: ?Sized> PluginLoadResult<T> {
    pub fn loaded(name: &str, plugin: Box<T>, source: &str) -> Self {
        Self {
            name: name.to_string(),
            plugin: Some(plugin),
            error: None,
            recovery_hint: None,
            source: source.to_string(),
        }
    }

    pub fn failed(name: &str, error: String, recovery_hint: Option<String>, source: &str) -> Self {
        Self {
            name: name.to_string(),
            plugin: None,
            error: Some(error),
            recovery_hint,
            source: source.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.plugin.is_some() && self.error.as_deref().map_or(true, str::is_empty)
    }
}

impl<T: ?Sized> fmt::Debug for PluginLoadResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLoadResult")
            .field("name", &self.name)
            .field("plugin", &self.plugin.is_some())
            .field("error", &self.error)
            .field("recovery_hint", &self.recovery_hint)
            .field("source", &self.source)
            .finish()
    }
}

/// Process context handed to providers during `configure()`
#[derive(Debug, Clone, Default)]
pub struct PluginEnvironment {
    pub vars: HashMap<String, String>,
    pub config_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl PluginEnvironment {
    /// Snapshot of the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
            config_dir: dirs::config_dir().map(|d| d.join("podext")),
            cache_dir: dirs::cache_dir().map(|d| d.join("podext")),
        }
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}
