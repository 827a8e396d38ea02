//! Plugin Error Handling
//!
//! Error types for plugin discovery, registration, dependency resolution,
//! configuration and validation.

use crate::core::error_handling::ContextualError;
use thiserror::Error;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Error types for plugin system operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    /// Two providers registered under the same name
    #[error(
        "Plugin name conflict: '{name}' is provided by both {existing_source} and {new_source}; uninstall one of them"
    )]
    Conflict {
        name: String,
        existing_source: String,
        new_source: String,
    },

    /// Missing dependency or dependency cycle
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// Plugin reported an invalid configuration or state (all problems)
    #[error("Plugin '{plugin_name}' failed validation: {}", .errors.join("; "))]
    Validation {
        plugin_name: String,
        errors: Vec<String>,
    },

    /// Configuration table rejected by the plugin's schema
    #[error("Invalid configuration for plugin '{plugin_name}': {}", .errors.join("; "))]
    InvalidConfig {
        plugin_name: String,
        errors: Vec<String>,
    },

    /// Configuration accessed before configure() was called
    #[error("Plugin '{plugin_name}' is not configured")]
    NotConfigured { plugin_name: String },

    /// An external library, binary or crate feature the provider needs is absent
    #[error("Missing dependency '{dependency}': {message}")]
    MissingDependency { dependency: String, message: String },

    /// Provider could not be constructed
    #[error("Failed to construct '{symbol}': {cause}")]
    Construction { symbol: String, cause: String },

    /// Plugin execution failed
    #[error("Plugin '{plugin_name}' failed during '{operation}': {cause}")]
    Execution {
        plugin_name: String,
        operation: String,
        cause: String,
    },

    /// Generic plugin error
    #[error("{message}")]
    Generic { message: String },
}

/// Dependency resolution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// A declared dependency is not among the loaded plugins
    #[error("Plugin '{plugin}' depends on missing plugin(s): {}", .missing.join(", "))]
    Missing { plugin: String, missing: Vec<String> },

    /// Plugins depend on each other in a loop
    #[error("Dependency cycle detected: {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

impl DependencyError {
    /// Cycle path, empty for missing-dependency errors
    pub fn cycle(&self) -> &[String] {
        match self {
            DependencyError::Cycle { cycle } => cycle,
            DependencyError::Missing { .. } => &[],
        }
    }

    /// Missing dependency names, empty for cycles
    pub fn missing(&self) -> &[String] {
        match self {
            DependencyError::Missing { missing, .. } => missing,
            DependencyError::Cycle { .. } => &[],
        }
    }
}

impl PluginError {
    /// Whether this error aborts a whole capability group load
    pub fn is_group_fatal(&self) -> bool {
        matches!(
            self,
            PluginError::Conflict { .. } | PluginError::Dependency(DependencyError::Cycle { .. })
        )
    }
}

impl ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            PluginError::Conflict { .. }
                | PluginError::Dependency(_)
                | PluginError::Validation { .. }
                | PluginError::InvalidConfig { .. }
                | PluginError::MissingDependency { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PluginError::Conflict { .. } => Some("Conflicting plugins are installed"),
            PluginError::Dependency(DependencyError::Cycle { .. }) => {
                Some("Plugins declare a circular dependency")
            }
            PluginError::Dependency(DependencyError::Missing { .. }) => {
                Some("A plugin depends on a plugin that is not available")
            }
            PluginError::Validation { .. } => Some("A plugin rejected its configuration"),
            PluginError::InvalidConfig { .. } => Some("A plugin configuration section is invalid"),
            PluginError::MissingDependency { .. } => {
                Some("A plugin requires a dependency that is not installed")
            }
            _ => None,
        }
    }
}
