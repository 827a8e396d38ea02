//! Plugin Loader
//!
//! Populates a registry for one capability group in three phases:
//!
//! 1. register every discovery result (skipping names disabled in the
//!    configuration), after checking the whole batch for name conflicts;
//! 2. order the successfully loaded plugins so dependencies come first;
//! 3. configure and validate each plugin in that order.
//!
//! A failure in phase 3 only demotes the offending plugin. Conflicts and
//! dependency cycles fail the group.

use crate::plugin::capabilities::{Capability, Extractor, Extractors, Renderer, Renderers};
use crate::plugin::capabilities::{Transcriber, Transcribers};
use crate::plugin::discovery::{hint_for_error, DiscoveryConfig, PluginDiscovery};
use crate::plugin::error::{DependencyError, PluginError, PluginResult};
use crate::plugin::registry::PluginRegistry;
use crate::plugin::settings::LoaderConfig;
use crate::plugin::traits::Plugin;
use crate::plugin::types::{LifecycleState, PluginEnvironment, PluginLoadResult};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Plugin name → declared dependency names
pub type DependencyGraph = BTreeMap<String, Vec<String>>;

/// Order plugins so that every plugin follows its dependencies.
///
/// Ties are broken by name, so the result does not depend on input order.
/// The first plugin (in name order) with an undeclared dependency is reported
/// as `DependencyError::Missing`; a loop is reported as
/// `DependencyError::Cycle` with the path that closes it.
pub fn resolve_dependencies(graph: &DependencyGraph) -> Result<Vec<String>, DependencyError> {
    for (name, deps) in graph {
        let mut seen = HashSet::new();
        let missing: Vec<String> = deps
            .iter()
            .filter(|d| !graph.contains_key(d.as_str()) && seen.insert(d.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(DependencyError::Missing {
                plugin: name.clone(),
                missing,
            });
        }
    }

    let (order, unresolved) = kahn_order(graph);
    if unresolved.is_empty() {
        Ok(order)
    } else {
        Err(DependencyError::Cycle {
            cycle: find_cycle(graph, &unresolved),
        })
    }
}

/// Kahn's algorithm with a name-ordered ready set. Returns the emitted order
/// and the names that could not be emitted.
fn kahn_order(graph: &DependencyGraph) -> (Vec<String>, BTreeSet<&str>) {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for (name, deps) in graph {
        let unique: BTreeSet<&str> = deps
            .iter()
            .map(String::as_str)
            .filter(|d| graph.contains_key(*d))
            .collect();
        in_degree.insert(name.as_str(), unique.len());
        for dep in unique {
            dependents.entry(dep).or_default().push(name.as_str());
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        if let Some(children) = dependents.get(name) {
            for child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*child);
                    }
                }
            }
        }
    }

    let emitted: HashSet<&str> = order.iter().map(String::as_str).collect();
    let unresolved = graph
        .keys()
        .map(String::as_str)
        .filter(|name| !emitted.contains(name))
        .collect();
    (order, unresolved)
}

/// Depth-first search over the unresolved plugins for a closed path,
/// e.g. `["a", "b", "a"]`
fn find_cycle(graph: &DependencyGraph, unresolved: &BTreeSet<&str>) -> Vec<String> {
    fn visit<'a>(
        node: &'a str,
        graph: &'a DependencyGraph,
        unresolved: &BTreeSet<&'a str>,
        stack: &mut Vec<&'a str>,
        finished: &mut HashSet<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = stack.iter().position(|n| *n == node) {
            let mut cycle: Vec<String> = stack[pos..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        if finished.contains(node) {
            return None;
        }

        stack.push(node);
        let deps: BTreeSet<&str> = graph
            .get(node)
            .map(|deps| {
                deps.iter()
                    .map(String::as_str)
                    .filter(|d| unresolved.contains(d))
                    .collect()
            })
            .unwrap_or_default();
        for dep in deps {
            if let Some(cycle) = visit(dep, graph, unresolved, stack, finished) {
                return Some(cycle);
            }
        }
        stack.pop();
        finished.insert(node);
        None
    }

    let mut finished = HashSet::new();
    for start in unresolved {
        let mut stack = Vec::new();
        if let Some(cycle) = visit(*start, graph, unresolved, &mut stack, &mut finished) {
            return cycle;
        }
    }
    unresolved.iter().map(|n| n.to_string()).collect()
}

/// Outcome of loading one capability group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub group: String,
    /// Configured and validated, in dependency order
    pub loaded: Vec<String>,
    /// Registered or demoted as broken
    pub broken: Vec<String>,
    /// Skipped because the configuration disables them
    pub disabled: Vec<String>,
}

impl LoadReport {
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.broken.is_empty()
    }
}

/// One registry per standard capability group
#[derive(Debug, Default)]
pub struct PluginSet {
    pub extractors: PluginRegistry<dyn Extractor>,
    pub transcribers: PluginRegistry<dyn Transcriber>,
    pub renderers: PluginRegistry<dyn Renderer>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Drives discovery, registration, dependency ordering and configuration
#[derive(Debug, Clone, Default)]
pub struct PluginLoader {
    config: LoaderConfig,
    environment: PluginEnvironment,
    discovery: PluginDiscovery,
}

impl PluginLoader {
    pub fn new(
        config: LoaderConfig,
        environment: PluginEnvironment,
        discovery: DiscoveryConfig,
    ) -> Self {
        Self {
            config,
            environment,
            discovery: PluginDiscovery::new(discovery),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn discovery(&self) -> &PluginDiscovery {
        &self.discovery
    }

    /// Discover capability `C` and load the results into `registry`
    pub async fn load_group<C: Capability>(
        &self,
        registry: &mut PluginRegistry<C::Object>,
        default_priority: i32,
    ) -> PluginResult<LoadReport> {
        log::debug!("Loading {} plugins", C::GROUP);
        let results = self.discovery.discover::<C>();
        self.load_results(C::GROUP, registry, results, default_priority)
            .await
    }

    /// Load already discovered results into `registry`
    ///
    /// On a dependency cycle the plugins outside the cycle are still
    /// configured, validated and made `Active`, and the cycle members are
    /// marked broken, before `Err(Dependency(Cycle))` is returned. The
    /// registry stays usable after that error. A conflict returns `Err`
    /// before anything is registered.
    pub async fn load_results<T>(
        &self,
        group: &str,
        registry: &mut PluginRegistry<T>,
        results: Vec<PluginLoadResult<T>>,
        default_priority: i32,
    ) -> PluginResult<LoadReport>
    where
        T: ?Sized + Plugin,
    {
        let mut report = LoadReport::new(group);

        // Phase 1: register
        let mut batch = Vec::with_capacity(results.len());
        for result in results {
            if self.config.is_disabled(&result.name) {
                log::debug!("Plugin '{}' is disabled by configuration", result.name);
                report.disabled.push(result.name);
                continue;
            }
            batch.push(result);
        }
        check_conflicts(registry, &batch)?;

        let mut candidates = Vec::new();
        for result in batch {
            let priority = self.config.priority_for(&result.name, default_priority);
            let name = result.name.clone();
            let usable = result.is_success();
            registry.register_result(result, priority)?;
            if usable {
                candidates.push(name);
            } else {
                report.broken.push(name);
            }
        }

        // Phase 2: dependency order
        let (order, cycle) = dependency_order(registry, candidates, &mut report);

        // Phase 3: configure and validate
        for name in &order {
            let config = self.config.config_for(name);
            let Some(plugin) = registry.get_mut(name) else {
                continue;
            };
            let outcome = configure_and_validate(plugin, &config, &self.environment).await;
            match outcome {
                Ok(()) => report.loaded.push(name.clone()),
                Err(e) => {
                    let hint = hint_for_error(&e);
                    registry.mark_broken(name, e.to_string(), hint);
                    report.broken.push(name.clone());
                }
            }
        }
        for name in &report.loaded {
            if let Some(plugin) = registry.get_mut(name) {
                plugin.base_mut().set_state(LifecycleState::Active);
            }
        }

        if let Some(error) = cycle {
            return Err(PluginError::Dependency(error));
        }

        log::debug!(
            "Loaded {} {} plugin(s), {} broken, {} disabled",
            report.loaded.len(),
            group,
            report.broken.len(),
            report.disabled.len()
        );
        Ok(report)
    }
}

/// Resolve the load order, demoting plugins with missing dependencies (and
/// then their dependents) and every plugin left over by a cycle.
fn dependency_order<T: ?Sized + Plugin>(
    registry: &mut PluginRegistry<T>,
    mut active: Vec<String>,
    report: &mut LoadReport,
) -> (Vec<String>, Option<DependencyError>) {
    loop {
        let graph: DependencyGraph = active
            .iter()
            .filter_map(|name| {
                registry
                    .get(name)
                    .map(|plugin| (name.clone(), plugin.plugin_info().depends_on))
            })
            .collect();

        let error = match resolve_dependencies(&graph) {
            Ok(order) => return (order, None),
            Err(error) => error,
        };

        match &error {
            DependencyError::Missing { plugin, missing } => {
                let hint = format!(
                    "Install or enable the plugin(s) '{}' this plugin depends on",
                    missing.join("', '")
                );
                registry.mark_broken(plugin, error.to_string(), Some(hint));
                report.broken.push(plugin.clone());
                active.retain(|name| name != plugin);
            }
            DependencyError::Cycle { .. } => {
                log::error!("{}", error);
                let (order, unresolved) = kahn_order(&graph);
                for name in unresolved {
                    registry.mark_broken(name, error.to_string(), None);
                    report.broken.push(name.to_string());
                }
                return (order, Some(error));
            }
        }
    }
}

/// Fail on the first name that is already registered or repeats within the batch
fn check_conflicts<T: ?Sized>(
    registry: &PluginRegistry<T>,
    batch: &[PluginLoadResult<T>],
) -> PluginResult<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for result in batch {
        let existing = registry
            .get_entry(&result.name)
            .map(|entry| entry.source())
            .or_else(|| seen.get(result.name.as_str()).copied());
        if let Some(existing_source) = existing {
            log::error!(
                "Plugin '{}' from {} conflicts with the one from {}",
                result.name,
                result.source,
                existing_source
            );
            return Err(PluginError::Conflict {
                name: result.name.clone(),
                existing_source: existing_source.to_string(),
                new_source: result.source.clone(),
            });
        }
        seen.insert(&result.name, &result.source);
    }
    Ok(())
}

async fn configure_and_validate<T: ?Sized + Plugin>(
    plugin: &mut T,
    config: &toml::Table,
    environment: &PluginEnvironment,
) -> PluginResult<()> {
    plugin.configure(config, environment).await?;
    plugin.validate().await?;
    plugin.base_mut().set_state(LifecycleState::Validated);
    Ok(())
}

/// Call `cleanup()` on every enabled plugin. Failures are logged and do not
/// stop the remaining plugins. Returns how many cleaned up successfully.
pub async fn cleanup_registry<T: ?Sized + Plugin>(registry: &mut PluginRegistry<T>) -> usize {
    let names: Vec<String> = registry
        .get_enabled()
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();

    let mut cleaned = 0;
    for name in names {
        let Some(plugin) = registry.get_mut(&name) else {
            continue;
        };
        if plugin.lifecycle_state() == LifecycleState::CleanedUp {
            continue;
        }
        match plugin.cleanup().await {
            Ok(()) => cleaned += 1,
            Err(e) => log::warn!("Cleanup of plugin '{}' failed: {}", name, e),
        }
        plugin.base_mut().set_state(LifecycleState::CleanedUp);
    }
    cleaned
}

/// Load every standard group into `set`. Each group is loaded independently;
/// a fatal error in one group does not stop the others.
pub async fn load_all(
    loader: &PluginLoader,
    set: &mut PluginSet,
    default_priority: i32,
) -> Vec<(&'static str, PluginResult<LoadReport>)> {
    vec![
        (
            Extractors::GROUP,
            loader
                .load_group::<Extractors>(&mut set.extractors, default_priority)
                .await,
        ),
        (
            Transcribers::GROUP,
            loader
                .load_group::<Transcribers>(&mut set.transcribers, default_priority)
                .await,
        ),
        (
            Renderers::GROUP,
            loader
                .load_group::<Renderers>(&mut set.renderers, default_priority)
                .await,
        ),
    ]
}

/// Clean up every group in `set`
pub async fn cleanup_all(set: &mut PluginSet) -> usize {
    cleanup_registry(&mut set.extractors).await
        + cleanup_registry(&mut set.transcribers).await
        + cleanup_registry(&mut set.renderers).await
}
