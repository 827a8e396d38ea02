//! Plugin Trait System
//!
//! The contract every capability provider satisfies.
//!
//! # Lifecycle
//!
//! `Uninitialized → Configured → Validated → Active → CleanedUp`
//!
//! - `configure()` is called exactly once, before any capability method.
//! - `validate()` may fail; it must be idempotent and free of side effects.
//! - `cleanup()` is called at most once at shutdown and may be skipped entirely
//!   if the process dies.
//!
//! Providers embed a [`PluginBase`] which carries the lifecycle state and the
//! configuration table so the default methods can work without extra code.
//! Construction and the static descriptor live on [`Provider`], which the
//! discovery macros use to build factories.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{LifecycleState, PluginEnvironment, PluginInfo};
use toml::Table;

/// Lifecycle state and configuration storage shared by all providers
#[derive(Debug, Clone, Default)]
pub struct PluginBase {
    state: LifecycleState,
    config: Option<Table>,
}

impl PluginBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
    }

    /// Check `config` against the descriptor's schema and store it
    pub fn apply_config(&mut self, info: &PluginInfo, config: &Table) -> PluginResult<()> {
        let stored = match &info.config_schema {
            Some(schema) => {
                schema
                    .validate(config)
                    .map_err(|errors| PluginError::InvalidConfig {
                        plugin_name: info.name.clone(),
                        errors,
                    })?
            }
            None => config.clone(),
        };
        self.config = Some(stored);
        self.state = LifecycleState::Configured;
        Ok(())
    }

    pub fn config(&self) -> Option<&Table> {
        self.config.as_ref()
    }
}

/// Base plugin trait that all providers implement
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Provider descriptor
    fn plugin_info(&self) -> PluginInfo;

    fn base(&self) -> &PluginBase;

    fn base_mut(&mut self) -> &mut PluginBase;

    /// Apply configuration. The default validates against the descriptor's
    /// schema and stores the table; override to perform setup, calling
    /// `self.base_mut().apply_config(..)` first.
    async fn configure(&mut self, config: &Table, _env: &PluginEnvironment) -> PluginResult<()> {
        let info = self.plugin_info();
        self.base_mut().apply_config(&info, config)
    }

    /// Check credentials, connectivity or required binaries
    async fn validate(&self) -> PluginResult<()> {
        Ok(())
    }

    /// Release held resources
    async fn cleanup(&mut self) -> PluginResult<()> {
        Ok(())
    }

    fn lifecycle_state(&self) -> LifecycleState {
        self.base().state()
    }

    fn is_initialized(&self) -> bool {
        self.base().config().is_some()
    }

    /// Configuration stored by `configure()`
    fn config(&self) -> PluginResult<&Table> {
        self.base()
            .config()
            .ok_or_else(|| PluginError::NotConfigured {
                plugin_name: self.plugin_info().name,
            })
    }
}

/// Static side of a provider: descriptor plus construction paths
pub trait Provider: Sized {
    /// Descriptor read once at discovery time
    fn descriptor() -> PluginInfo;

    /// Construct with expensive setup deferred until `configure()`.
    /// `None` means this provider has no deferred construction path.
    fn new_deferred() -> Option<PluginResult<Self>> {
        None
    }

    /// Plain no-argument construction
    fn create() -> PluginResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::schema::{ConfigSchema, FieldKind};

    struct FeedPlugin {
        base: PluginBase,
    }

    #[async_trait::async_trait]
    impl Plugin for FeedPlugin {
        fn plugin_info(&self) -> PluginInfo {
            PluginInfo::new("rss", "0.4.0", "RSS feed reader")
                .with_schema(ConfigSchema::new().with_default("limit", FieldKind::Integer, 20))
        }

        fn base(&self) -> &PluginBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut PluginBase {
            &mut self.base
        }

        async fn validate(&self) -> PluginResult<()> {
            let limit = self.config()?.get("limit").and_then(|v| v.as_integer());
            match limit {
                Some(n) if n > 0 => Ok(()),
                _ => Err(PluginError::Validation {
                    plugin_name: "rss".to_string(),
                    errors: vec!["limit must be positive".to_string()],
                }),
            }
        }
    }

    fn feed() -> FeedPlugin {
        FeedPlugin {
            base: PluginBase::new(),
        }
    }

    #[tokio::test]
    async fn test_config_before_configure_fails() {
        let plugin = feed();
        assert!(!plugin.is_initialized());
        assert_eq!(plugin.lifecycle_state(), LifecycleState::Uninitialized);
        match plugin.config() {
            Err(PluginError::NotConfigured { plugin_name }) => assert_eq!(plugin_name, "rss"),
            other => panic!("Expected NotConfigured, got {:?}", other),
        }
        assert!(plugin.validate().await.is_err());
    }

    #[tokio::test]
    async fn test_default_configure_applies_schema() {
        let mut plugin = feed();
        plugin
            .configure(&Table::new(), &PluginEnvironment::default())
            .await
            .unwrap();

        assert!(plugin.is_initialized());
        assert_eq!(plugin.lifecycle_state(), LifecycleState::Configured);
        assert_eq!(
            plugin.config().unwrap().get("limit").and_then(|v| v.as_integer()),
            Some(20)
        );
        assert!(plugin.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_schema_failure_is_an_error_not_a_panic() {
        let mut plugin = feed();
        let config: Table = "limit = \"ten\"\nbogus = 1".parse().unwrap();
        let err = plugin
            .configure(&config, &PluginEnvironment::default())
            .await
            .unwrap_err();

        match err {
            PluginError::InvalidConfig {
                plugin_name,
                errors,
            } => {
                assert_eq!(plugin_name, "rss");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
        assert!(!plugin.is_initialized());
    }

    #[tokio::test]
    async fn test_validation_reports_failure() {
        let mut plugin = feed();
        let config: Table = "limit = 0".parse().unwrap();
        plugin
            .configure(&config, &PluginEnvironment::default())
            .await
            .unwrap();
        assert!(matches!(
            plugin.validate().await,
            Err(PluginError::Validation { .. })
        ));
        // idempotent
        assert!(plugin.validate().await.is_err());
    }
}
