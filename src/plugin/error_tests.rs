//! Tests for plugin error formatting and classification

#[cfg(test)]
mod tests {
    use super::super::error::*;
    use crate::core::error_handling::ContextualError;

    #[test]
    fn test_conflict_message_names_both_sources() {
        let error = PluginError::Conflict {
            name: "youtube".to_string(),
            existing_source: "builtin".to_string(),
            new_source: "podext-youtube@0.3.1".to_string(),
        };

        let display = error.to_string();
        assert!(display.contains("'youtube'"));
        assert!(display.contains("builtin"));
        assert!(display.contains("podext-youtube@0.3.1"));
        assert!(error.is_group_fatal());
    }

    #[test]
    fn test_validation_error_carries_all_messages() {
        let error = PluginError::Validation {
            plugin_name: "openai".to_string(),
            errors: vec!["api_key is missing".to_string(), "model unknown".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "Plugin 'openai' failed validation: api_key is missing; model unknown"
        );
        assert!(!error.is_group_fatal());
        assert!(error.is_user_actionable());
    }

    #[test]
    fn test_dependency_errors() {
        let missing = DependencyError::Missing {
            plugin: "summary".to_string(),
            missing: vec!["transcript".to_string()],
        };
        assert_eq!(
            missing.to_string(),
            "Plugin 'summary' depends on missing plugin(s): transcript"
        );
        assert_eq!(missing.missing(), &["transcript".to_string()]);
        assert!(missing.cycle().is_empty());

        let cycle = DependencyError::Cycle {
            cycle: vec!["x".to_string(), "y".to_string(), "x".to_string()],
        };
        assert_eq!(cycle.to_string(), "Dependency cycle detected: x -> y -> x");

        let error: PluginError = cycle.into();
        assert!(error.is_group_fatal());
        assert_eq!(error.to_string(), "Dependency cycle detected: x -> y -> x");
        assert!(!PluginError::from(missing).is_group_fatal());
    }

    #[test]
    fn test_not_configured_is_internal() {
        let error = PluginError::NotConfigured {
            plugin_name: "rss".to_string(),
        };
        assert_eq!(error.to_string(), "Plugin 'rss' is not configured");
        assert!(!error.is_user_actionable());
    }

    #[test]
    fn test_execution_error_display() {
        let error = PluginError::Execution {
            plugin_name: "whisper".to_string(),
            operation: "transcribe".to_string(),
            cause: "timeout".to_string(),
        };

        let display = error.to_string();
        assert!(display.contains("whisper"));
        assert!(display.contains("transcribe"));
        assert!(display.contains("timeout"));
    }
}
