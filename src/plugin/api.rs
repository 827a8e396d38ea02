//! Public API for the plugin system
//!
//! External modules should import from here rather than directly from
//! internal modules. The `provider!` and `declare_provider!` macros expand to
//! paths under this module.

// Contract
pub use crate::plugin::capabilities::{
    Capability, ExtractedContent, Extractor, Extractors, ProviderInstance, RenderDocument,
    Renderer, Renderers, Transcriber, Transcribers, Transcript, TranscriptSegment, EXTRACTORS,
    RENDERERS, STANDARD_GROUPS, TRANSCRIBERS,
};
pub use crate::core::version::{check_api_version_compatible, get_api_version};
pub use crate::plugin::schema::{ConfigSchema, FieldKind, SchemaField};
pub use crate::plugin::traits::{Plugin, PluginBase, Provider};
pub use crate::plugin::types::{
    priority, LifecycleState, PluginEnvironment, PluginInfo, PluginLoadResult, PluginStatus,
};

// Error handling
pub use crate::plugin::error::{DependencyError, PluginError, PluginResult};

// Discovery
pub use crate::plugin::discovery::{
    find_symbol, get_default_plugin_path, hint_for_error, recovery_hint, BuiltinDeclaration,
    DiscoveryConfig, LoadFailure, PluginDiscovery, ProviderSymbol, BUILTIN_SOURCE,
};
pub use crate::plugin::manifest::{
    load_manifests, ManifestError, PackageManifest, ProviderDeclaration,
};

// Registry
pub use crate::plugin::registry::{PluginEntry, PluginRegistry};

// Loading
pub use crate::plugin::loader::{
    cleanup_all, cleanup_registry, load_all, resolve_dependencies, DependencyGraph, LoadReport,
    PluginLoader, PluginSet,
};
pub use crate::plugin::settings::{LoaderConfig, PluginSettings};

// Built-in providers
pub use crate::plugin::builtin::{MarkdownRenderer, PlainTextRenderer};
