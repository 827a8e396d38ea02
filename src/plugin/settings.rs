//! Per-plugin loader settings
//!
//! The `[plugins.<name>]` tables of the runtime configuration file.
//! Plugins without an entry are enabled and use the group's default priority.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use toml::Table;

/// Settings for one plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginSettings {
    pub enabled: bool,
    /// Overrides the group default when set
    pub priority: Option<i32>,
    /// Passed to the plugin's `configure()`
    pub config: Table,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: None,
            config: Table::new(),
        }
    }
}

impl PluginSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_config(mut self, config: Table) -> Self {
        self.config = config;
        self
    }
}

/// Plugin name → settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoaderConfig {
    plugins: HashMap<String, PluginSettings>,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugin(mut self, name: &str, settings: PluginSettings) -> Self {
        self.plugins.insert(name.to_string(), settings);
        self
    }

    pub fn settings(&self, name: &str) -> Option<&PluginSettings> {
        self.plugins.get(name)
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.plugins.get(name).is_some_and(|s| !s.enabled)
    }

    /// Configured priority, else `default`
    pub fn priority_for(&self, name: &str, default: i32) -> i32 {
        self.plugins
            .get(name)
            .and_then(|s| s.priority)
            .unwrap_or(default)
    }

    /// Configuration table for `configure()`; empty when none is set
    pub fn config_for(&self, name: &str) -> Table {
        self.plugins
            .get(name)
            .map(|s| s.config.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
