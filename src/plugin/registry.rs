//! Plugin Registry
//!
//! Per-capability store of named entries (loaded, disabled or broken) with
//! conflict detection and a priority-ordered view of the usable subset.
//!
//! The registry assumes a single writer while plugins are being loaded. Once
//! loading is done it is only read, and a `&PluginRegistry` can be shared
//! between threads as long as `T` is `Sync`.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{PluginLoadResult, PluginStatus};
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// A registered name and whatever is known about its provider.
///
/// A `loaded` entry always holds a plugin; a `broken` entry never does.
pub struct PluginEntry<T: ?Sized> {
    name: String,
    plugin: Option<Box<T>>,
    status: PluginStatus,
    error: Option<String>,
    recovery_hint: Option<String>,
    priority: i32,
    source: String,
}

impl<T: ?Sized> PluginEntry<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin(&self) -> Option<&T> {
        self.plugin.as_deref()
    }

    pub fn status(&self) -> PluginStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn recovery_hint(&self) -> Option<&str> {
        self.recovery_hint.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.status == PluginStatus::Loaded
    }
}

impl<T: ?Sized> fmt::Debug for PluginEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .field("plugin", &self.plugin.is_some())
            .field("status", &self.status)
            .field("error", &self.error)
            .field("recovery_hint", &self.recovery_hint)
            .field("priority", &self.priority)
            .field("source", &self.source)
            .finish()
    }
}

/// Highest priority first, then name ascending
fn by_priority<T: ?Sized>(a: &PluginEntry<T>, b: &PluginEntry<T>) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.name.cmp(&b.name))
}

/// Registry of providers for one capability type
pub struct PluginRegistry<T: ?Sized> {
    entries: HashMap<String, PluginEntry<T>>,

    /// Names of loaded entries in priority order; reset on every write
    enabled_cache: OnceCell<Vec<String>>,
}

impl<T: ?Sized> fmt::Debug for PluginRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("entries", &self.all_entries())
            .finish()
    }
}

impl<T: ?Sized> PluginRegistry<T> {
    /// Create a new empty plugin registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            enabled_cache: OnceCell::new(),
        }
    }

    fn invalidate(&mut self) {
        self.enabled_cache = OnceCell::new();
    }

    /// Register a provider, or a broken entry when `plugin` is `None`.
    ///
    /// Fails with `PluginError::Conflict` if the name is already present in
    /// any status.
    pub fn register(
        &mut self,
        name: &str,
        plugin: Option<Box<T>>,
        priority: i32,
        source: &str,
        error: Option<String>,
        recovery_hint: Option<String>,
    ) -> PluginResult<()> {
        if let Some(existing) = self.entries.get(name) {
            log::error!(
                "Plugin '{}' from {} conflicts with the one from {}",
                name,
                source,
                existing.source
            );
            return Err(PluginError::Conflict {
                name: name.to_string(),
                existing_source: existing.source.clone(),
                new_source: source.to_string(),
            });
        }

        let status = if plugin.is_some() {
            log::debug!(
                "Registered plugin '{}' from {} with priority {}",
                name,
                source,
                priority
            );
            PluginStatus::Loaded
        } else {
            log::warn!(
                "Registered broken plugin '{}' from {}: {}",
                name,
                source,
                error.as_deref().unwrap_or("unknown error")
            );
            PluginStatus::Broken
        };

        self.entries.insert(
            name.to_string(),
            PluginEntry {
                name: name.to_string(),
                plugin,
                status,
                error,
                recovery_hint,
                priority,
                source: source.to_string(),
            },
        );
        self.invalidate();
        Ok(())
    }

    /// Register a discovery outcome, keeping its error and hint intact
    pub fn register_result(&mut self, result: PluginLoadResult<T>, priority: i32) -> PluginResult<()> {
        let PluginLoadResult {
            name,
            plugin,
            error,
            recovery_hint,
            source,
        } = result;
        // A result carrying an error is broken even if an instance came along
        let plugin = if error.as_deref().map_or(true, str::is_empty) {
            plugin
        } else {
            None
        };
        self.register(&name, plugin, priority, &source, error, recovery_hint)
    }

    /// The plugin, only if its entry is loaded
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .get(name)
            .filter(|entry| entry.is_loaded())
            .and_then(|entry| entry.plugin.as_deref())
    }

    /// Mutable access to a loaded plugin
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries
            .get_mut(name)
            .filter(|entry| entry.status == PluginStatus::Loaded)
            .and_then(|entry| entry.plugin.as_deref_mut())
    }

    /// Entry in any status, for diagnostics
    pub fn get_entry(&self, name: &str) -> Option<&PluginEntry<T>> {
        self.entries.get(name)
    }

    fn enabled_names(&self) -> &[String] {
        self.enabled_cache.get_or_init(|| {
            let mut loaded: Vec<&PluginEntry<T>> =
                self.entries.values().filter(|e| e.is_loaded()).collect();
            loaded.sort_by(|a, b| by_priority(a, b));
            loaded.into_iter().map(|e| e.name.clone()).collect()
        })
    }

    /// Loaded plugins, highest priority first, ties broken by name
    pub fn get_enabled(&self) -> Vec<(&str, &T)> {
        self.enabled_names()
            .iter()
            .filter_map(|name| self.get(name).map(|plugin| (name.as_str(), plugin)))
            .collect()
    }

    /// Enabled plugins passing `capable`, in priority order
    pub fn find_capable<F>(&self, capable: F) -> Vec<(&str, &T)>
    where
        F: Fn(&T) -> bool,
    {
        self.get_enabled()
            .into_iter()
            .filter(|(_, plugin)| capable(*plugin))
            .collect()
    }

    /// Highest-priority enabled plugin passing `capable`
    pub fn find_first_capable<F>(&self, capable: F) -> Option<(&str, &T)>
    where
        F: Fn(&T) -> bool,
    {
        self.get_enabled()
            .into_iter()
            .find(|(_, plugin)| capable(*plugin))
    }

    /// Disable a loaded entry. Returns false for unknown or broken names.
    pub fn disable(&mut self, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if entry.status == PluginStatus::Broken {
            return false;
        }
        entry.status = PluginStatus::Disabled;
        log::debug!("Disabled plugin '{}'", name);
        self.invalidate();
        true
    }

    /// Re-enable an entry. Returns false for unknown names and for entries
    /// without a plugin instance.
    pub fn enable(&mut self, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if entry.plugin.is_none() {
            return false;
        }
        entry.status = PluginStatus::Loaded;
        log::debug!("Enabled plugin '{}'", name);
        self.invalidate();
        true
    }

    /// Demote an entry to broken, dropping its plugin instance
    pub fn mark_broken(&mut self, name: &str, error: String, recovery_hint: Option<String>) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        log::warn!("Plugin '{}' is broken: {}", name, error);
        entry.plugin = None;
        entry.status = PluginStatus::Broken;
        entry.error = Some(error);
        if recovery_hint.is_some() {
            entry.recovery_hint = recovery_hint;
        }
        self.invalidate();
        true
    }

    /// Every entry, sorted by priority then name
    pub fn all_entries(&self) -> Vec<&PluginEntry<T>> {
        let mut entries: Vec<&PluginEntry<T>> = self.entries.values().collect();
        entries.sort_by(|a, b| by_priority(a, b));
        entries
    }

    /// Broken entries, sorted by priority then name
    pub fn get_broken(&self) -> Vec<&PluginEntry<T>> {
        self.all_entries()
            .into_iter()
            .filter(|e| e.status == PluginStatus::Broken)
            .collect()
    }

    pub fn priority_of(&self, name: &str) -> Option<i32> {
        self.entries.get(name).map(|e| e.priority)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T: ?Sized> Default for PluginRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
