//! Capability base types
//!
//! One sub-trait of [`Plugin`] per capability group. Concrete providers
//! implement one of these; the registry for a group stores boxed trait objects
//! of that capability.

use crate::plugin::error::PluginResult;
use crate::plugin::traits::Plugin;
use crate::plugin::types::PluginInfo;
use std::path::Path;
use toml::Table;

/// Group name for content extractors
pub const EXTRACTORS: &str = "extractors";
/// Group name for transcription backends
pub const TRANSCRIBERS: &str = "transcribers";
/// Group name for output renderers
pub const RENDERERS: &str = "renderers";

/// All standard capability groups, in discovery order
pub const STANDARD_GROUPS: [&str; 3] = [EXTRACTORS, TRANSCRIBERS, RENDERERS];

/// Text and metadata pulled out of an episode source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub title: String,
    pub text: String,
    pub audio_url: Option<String>,
    pub metadata: Table,
}

/// One timed piece of a transcript
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
    pub segments: Vec<TranscriptSegment>,
}

/// Input handed to output renderers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderDocument {
    pub title: String,
    /// (heading, body) pairs in display order
    pub sections: Vec<(String, String)>,
    pub metadata: Table,
}

/// Pulls content out of an episode page, feed or file
#[async_trait::async_trait]
pub trait Extractor: Plugin {
    /// Whether this provider can handle `source` (URL or path)
    fn can_handle(&self, source: &str) -> bool;

    async fn extract(&self, source: &str) -> PluginResult<ExtractedContent>;
}

/// Turns audio into text
#[async_trait::async_trait]
pub trait Transcriber: Plugin {
    /// Whether this backend accepts audio with this file extension
    fn supports_format(&self, extension: &str) -> bool;

    async fn transcribe(&self, audio: &Path) -> PluginResult<Transcript>;
}

/// Renders processed content into an output format
pub trait Renderer: Plugin {
    fn format_name(&self) -> &str;

    fn file_extension(&self) -> &str;

    fn render(&self, document: &RenderDocument) -> PluginResult<String>;
}

/// A freshly constructed provider, tagged with the capability it implements
pub enum ProviderInstance {
    Extractor(Box<dyn Extractor>),
    Transcriber(Box<dyn Transcriber>),
    Renderer(Box<dyn Renderer>),
}

impl ProviderInstance {
    /// Group name of the capability this instance implements
    pub fn group(&self) -> &'static str {
        match self {
            ProviderInstance::Extractor(_) => EXTRACTORS,
            ProviderInstance::Transcriber(_) => TRANSCRIBERS,
            ProviderInstance::Renderer(_) => RENDERERS,
        }
    }

    pub fn plugin_info(&self) -> PluginInfo {
        match self {
            ProviderInstance::Extractor(p) => p.plugin_info(),
            ProviderInstance::Transcriber(p) => p.plugin_info(),
            ProviderInstance::Renderer(p) => p.plugin_info(),
        }
    }
}

/// Ties a capability trait object to its group and instance variant
pub trait Capability: 'static {
    type Object: ?Sized + Plugin;

    const GROUP: &'static str;

    /// Take the instance if it implements this capability, otherwise hand it back
    fn from_instance(instance: ProviderInstance) -> Result<Box<Self::Object>, ProviderInstance>;
}

/// Marker for the extractor group
pub struct Extractors;

/// Marker for the transcriber group
pub struct Transcribers;

/// Marker for the renderer group
pub struct Renderers;

impl Capability for Extractors {
    type Object = dyn Extractor;
    const GROUP: &'static str = EXTRACTORS;

    fn from_instance(instance: ProviderInstance) -> Result<Box<dyn Extractor>, ProviderInstance> {
        match instance {
            ProviderInstance::Extractor(plugin) => Ok(plugin),
            other => Err(other),
        }
    }
}

impl Capability for Transcribers {
    type Object = dyn Transcriber;
    const GROUP: &'static str = TRANSCRIBERS;

    fn from_instance(
        instance: ProviderInstance,
    ) -> Result<Box<dyn Transcriber>, ProviderInstance> {
        match instance {
            ProviderInstance::Transcriber(plugin) => Ok(plugin),
            other => Err(other),
        }
    }
}

impl Capability for Renderers {
    type Object = dyn Renderer;
    const GROUP: &'static str = RENDERERS;

    fn from_instance(instance: ProviderInstance) -> Result<Box<dyn Renderer>, ProviderInstance> {
        match instance {
            ProviderInstance::Renderer(plugin) => Ok(plugin),
            other => Err(other),
        }
    }
}
