//! Plugin Discovery
//!
//! Turns provider declarations into constructed provider instances. Provider
//! types are linked into the binary and announce themselves through
//! [`provider!`](crate::provider); declarations mapping `(group, name)` to a
//! provider symbol come from built-in [`declare_provider!`](crate::declare_provider)
//! submissions and from package manifests in the plugin directory.
//!
//! Discovery never fails as a whole: every declaration yields exactly one
//! [`PluginLoadResult`], either a provider or a classified error with an
//! optional recovery hint.

use crate::core::version::{get_api_version, is_api_compatible_with, parse_api_version};
use crate::plugin::capabilities::{Capability, ProviderInstance, STANDARD_GROUPS};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::manifest::{load_manifests, ProviderDeclaration};
use crate::plugin::types::{PluginInfo, PluginLoadResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use strum_macros::IntoStaticStr;
use thiserror::Error;

/// Source label for declarations compiled into the binary
pub const BUILTIN_SOURCE: &str = "builtin";

/// A provider type linked into this binary
pub struct ProviderSymbol {
    /// Name manifests refer to, e.g. `podext_youtube::YoutubeExtractor`
    pub symbol: &'static str,
    /// Capability group the type implements
    pub group: &'static str,
    pub descriptor: fn() -> PluginInfo,
    /// Construction with expensive setup deferred; `None` result means unsupported
    pub new_deferred: Option<fn() -> Option<PluginResult<ProviderInstance>>>,
    /// Plain no-argument construction
    pub new: Option<fn() -> PluginResult<ProviderInstance>>,
}

inventory::collect!(ProviderSymbol);

/// A `(group, name) → symbol` declaration compiled into the binary
pub struct BuiltinDeclaration {
    pub group: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

inventory::collect!(BuiltinDeclaration);

/// Register a provider type so declarations can refer to it by symbol.
///
/// ```ignore
/// podext::provider!(Extractor => YoutubeExtractor);
/// podext::provider!(Extractor => YoutubeExtractor, "podext_youtube::YoutubeExtractor");
/// ```
///
/// Without an explicit symbol the symbol is `module_path::Type`.
#[macro_export]
macro_rules! provider {
    (@group Extractor) => { $crate::plugin::api::EXTRACTORS };
    (@group Transcriber) => { $crate::plugin::api::TRANSCRIBERS };
    (@group Renderer) => { $crate::plugin::api::RENDERERS };

    ($kind:ident => $ty:ty) => {
        $crate::provider!($kind => $ty, concat!(module_path!(), "::", stringify!($ty)));
    };

    ($kind:ident => $ty:ty, $symbol:expr) => {
        $crate::__inventory::submit! {
            $crate::plugin::api::ProviderSymbol {
                symbol: $symbol,
                group: $crate::provider!(@group $kind),
                descriptor: <$ty as $crate::plugin::api::Provider>::descriptor,
                new_deferred: Some(|| {
                    <$ty as $crate::plugin::api::Provider>::new_deferred().map(|built| {
                        built.map(|p| {
                            $crate::plugin::api::ProviderInstance::$kind(Box::new(p))
                        })
                    })
                }),
                new: Some(|| {
                    <$ty as $crate::plugin::api::Provider>::create().map(|p| {
                        $crate::plugin::api::ProviderInstance::$kind(Box::new(p))
                    })
                }),
            }
        }
    };
}

/// Declare a built-in provider under `name` in `group`.
///
/// ```ignore
/// podext::declare_provider!("extractors", "youtube" => "podext::builtin::YoutubeExtractor");
/// ```
#[macro_export]
macro_rules! declare_provider {
    ($group:expr, $name:expr => $symbol:expr) => {
        $crate::__inventory::submit! {
            $crate::plugin::api::BuiltinDeclaration {
                group: $group,
                name: $name,
                symbol: $symbol,
            }
        }
    };
}

/// Find a linked provider type by symbol
pub fn find_symbol(symbol: &str) -> Option<&'static ProviderSymbol> {
    inventory::iter::<ProviderSymbol>().find(|s| s.symbol == symbol)
}

/// Why a declaration could not be turned into a provider
#[derive(Error, Debug, Clone, PartialEq, IntoStaticStr)]
pub enum LoadFailure {
    #[error("no provider named '{symbol}' is linked into this build")]
    UnknownSymbol { symbol: String },

    #[error("'{symbol}' implements {actual}, not {expected}")]
    WrongCapability {
        symbol: String,
        expected: String,
        actual: String,
    },

    #[error("'{symbol}' targets plugin API {declared}, host provides {host}")]
    IncompatibleApi {
        symbol: String,
        declared: String,
        host: String,
    },

    #[error("'{symbol}' descriptor has no {field}")]
    MalformedDescriptor { symbol: String, field: &'static str },

    #[error("'{symbol}' has no no-argument constructor")]
    NoConstructor { symbol: String },

    #[error("{0}")]
    Construction(PluginError),
}

impl LoadFailure {
    /// Variant name, used as the error prefix
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// `"<kind>: <message>"` as stored on broken entries
    pub fn describe(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

static HEAVY_RUNTIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(cuda|torch|onnx(?:runtime)?|whisper|ffmpeg)\b").ok());

fn heavy_runtime_hint(text: &str) -> Option<String> {
    let captures = HEAVY_RUNTIME.as_ref()?.captures(text)?;
    let runtime = captures.get(1)?.as_str().to_lowercase();
    let hint = match runtime.as_str() {
        "ffmpeg" => "Install ffmpeg (e.g. `apt install ffmpeg` or `brew install ffmpeg`) and make sure it is on PATH".to_string(),
        "cuda" => "Install the CUDA toolkit and rebuild with `cargo install podext --features cuda`".to_string(),
        other => format!(
            "Rebuild with local transcription support: `cargo install podext --features {}`",
            if other.starts_with("onnx") { "onnx" } else { other }
        ),
    };
    Some(hint)
}

/// Best-effort remediation for a discovery failure; `None` when nothing useful applies
pub fn recovery_hint(failure: &LoadFailure) -> Option<String> {
    if let Some(hint) = heavy_runtime_hint(&failure.to_string()) {
        return Some(hint);
    }

    match failure {
        LoadFailure::UnknownSymbol { symbol } => {
            let package = symbol.split("::").next().unwrap_or(symbol).replace('_', "-");
            Some(format!(
                "Install '{}' or remove its manifest from the plugin directory",
                package
            ))
        }
        LoadFailure::IncompatibleApi { symbol, host, .. } => {
            let major = parse_api_version(host).map(|(major, _)| major).unwrap_or(1);
            Some(format!(
                "Upgrade the package providing '{}' to a release built for plugin API {}.x",
                symbol, major
            ))
        }
        LoadFailure::MalformedDescriptor { symbol, field } => Some(format!(
            "'{}' is malformed: its descriptor must set a non-empty {}; report this to the plugin author",
            symbol, field
        )),
        LoadFailure::NoConstructor { .. } => Some(
            "The provider must implement Provider::create() taking no required arguments"
                .to_string(),
        ),
        LoadFailure::Construction(error) => hint_for_error(error),
        LoadFailure::WrongCapability { .. } => None,
    }
}

/// Remediation for a runtime plugin error, if one is obvious
pub fn hint_for_error(error: &PluginError) -> Option<String> {
    if let Some(hint) = heavy_runtime_hint(&error.to_string()) {
        return Some(hint);
    }
    match error {
        PluginError::MissingDependency { dependency, .. } => {
            Some(format!("Install '{}' and try again", dependency))
        }
        _ => None,
    }
}

/// Where to look for declarations and which names to skip
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Directory of package manifests; `None` disables manifest scanning
    pub search_path: Option<PathBuf>,
    /// Provider names that produce no result at all
    pub excluded_plugins: Vec<String>,
    pub include_builtins: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_path: get_default_plugin_path(),
            excluded_plugins: Vec::new(),
            include_builtins: true,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_search_path(mut self, path: Option<PathBuf>) -> Self {
        self.search_path = path;
        self
    }

    pub fn with_excluded(mut self, names: Vec<String>) -> Self {
        self.excluded_plugins = names;
        self
    }

    pub fn without_builtins(mut self) -> Self {
        self.include_builtins = false;
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_plugins.iter().any(|n| n == name)
    }
}

/// Default manifest directory: `<config_dir>/podext/plugins`
pub fn get_default_plugin_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("podext").join("plugins"))
}

/// Resolves declarations into provider instances
#[derive(Debug, Clone, Default)]
pub struct PluginDiscovery {
    config: DiscoveryConfig,
}

impl PluginDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Declarations for `group`: built-ins first (name order), then manifests
    /// (file order, then name order). Excluded names are dropped.
    pub fn declarations(&self, group: &str) -> Vec<ProviderDeclaration> {
        let mut declarations = Vec::new();

        if self.config.include_builtins {
            let mut builtins: Vec<ProviderDeclaration> = inventory::iter::<BuiltinDeclaration>()
                .filter(|d| d.group == group)
                .map(|d| ProviderDeclaration {
                    group: d.group.to_string(),
                    name: d.name.to_string(),
                    symbol: d.symbol.to_string(),
                    source: BUILTIN_SOURCE.to_string(),
                })
                .collect();
            builtins.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.symbol.cmp(&b.symbol)));
            declarations.extend(builtins);
        }

        if let Some(dir) = &self.config.search_path {
            for manifest in load_manifests(dir) {
                declarations.extend(manifest.declarations(group));
            }
        }

        declarations.retain(|d| {
            let excluded = self.config.is_excluded(&d.name);
            if excluded {
                log::debug!("Skipping excluded plugin '{}' ({})", d.name, d.source);
            }
            !excluded
        });
        declarations
    }

    /// Discover every declared provider of capability `C`
    pub fn discover<C: Capability>(&self) -> Vec<PluginLoadResult<C::Object>> {
        self.declarations(C::GROUP)
            .iter()
            .map(|decl| {
                let outcome = instantiate(decl).and_then(|instance| {
                    C::from_instance(instance).map_err(|other| LoadFailure::WrongCapability {
                        symbol: decl.symbol.clone(),
                        expected: C::GROUP.to_string(),
                        actual: other.group().to_string(),
                    })
                });
                into_result(decl, outcome)
            })
            .collect()
    }

    /// Discover one group without committing to a capability type
    pub fn discover_group(&self, group: &str) -> Vec<PluginLoadResult<ProviderInstance>> {
        self.declarations(group)
            .iter()
            .map(|decl| into_result(decl, instantiate(decl).map(Box::new)))
            .collect()
    }

    /// Discover every standard group, keyed by group name
    pub fn discover_all(&self) -> BTreeMap<String, Vec<PluginLoadResult<ProviderInstance>>> {
        STANDARD_GROUPS
            .iter()
            .map(|group| (group.to_string(), self.discover_group(group)))
            .collect()
    }
}

fn into_result<T: ?Sized>(
    decl: &ProviderDeclaration,
    outcome: Result<Box<T>, LoadFailure>,
) -> PluginLoadResult<T> {
    match outcome {
        Ok(plugin) => {
            log::debug!(
                "Discovered {} provider '{}' from {}",
                decl.group,
                decl.name,
                decl.source
            );
            PluginLoadResult::loaded(&decl.name, plugin, &decl.source)
        }
        Err(failure) => {
            log::debug!(
                "Failed to load {} provider '{}' from {}: {}",
                decl.group,
                decl.name,
                decl.source,
                failure
            );
            PluginLoadResult::failed(
                &decl.name,
                failure.describe(),
                recovery_hint(&failure),
                &decl.source,
            )
        }
    }
}

/// Resolve, check and construct one declaration
fn instantiate(decl: &ProviderDeclaration) -> Result<ProviderInstance, LoadFailure> {
    let symbol = find_symbol(&decl.symbol).ok_or_else(|| LoadFailure::UnknownSymbol {
        symbol: decl.symbol.clone(),
    })?;

    if symbol.group != decl.group {
        return Err(LoadFailure::WrongCapability {
            symbol: decl.symbol.clone(),
            expected: decl.group.clone(),
            actual: symbol.group.to_string(),
        });
    }

    let info = (symbol.descriptor)();
    if info.name.trim().is_empty() {
        return Err(LoadFailure::MalformedDescriptor {
            symbol: decl.symbol.clone(),
            field: "name",
        });
    }
    if info.version.trim().is_empty() {
        return Err(LoadFailure::MalformedDescriptor {
            symbol: decl.symbol.clone(),
            field: "version",
        });
    }

    let host = get_api_version();
    let declared = if info.api_version.trim().is_empty() {
        host
    } else {
        info.api_version.as_str()
    };
    if !is_api_compatible_with(declared, host) {
        return Err(LoadFailure::IncompatibleApi {
            symbol: decl.symbol.clone(),
            declared: declared.to_string(),
            host: host.to_string(),
        });
    }

    let deferred = symbol.new_deferred.and_then(|factory| factory());
    let built = match deferred {
        Some(result) => result,
        None => match symbol.new {
            Some(factory) => factory(),
            None => {
                return Err(LoadFailure::NoConstructor {
                    symbol: decl.symbol.clone(),
                })
            }
        },
    };
    let instance = built.map_err(LoadFailure::Construction)?;

    if instance.group() != decl.group {
        return Err(LoadFailure::WrongCapability {
            symbol: decl.symbol.clone(),
            expected: decl.group.clone(),
            actual: instance.group().to_string(),
        });
    }
    Ok(instance)
}
