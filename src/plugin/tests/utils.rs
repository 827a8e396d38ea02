//! Plugin Test Utilities
//!
//! Configurable mock providers shared by the registry, discovery and loader
//! tests, plus a handful of provider types registered through the real
//! `provider!` / `declare_provider!` macros.

use crate::plugin::capabilities::{
    ExtractedContent, Extractor, RenderDocument, Renderer, Transcriber, Transcript,
};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Plugin, PluginBase, Provider};
use crate::plugin::types::{PluginEnvironment, PluginInfo, PluginLoadResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use toml::Table;

/// Shared record of lifecycle calls, e.g. `["configure:a", "validate:a"]`
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Plugin names for calls with the given prefix, in call order
    pub fn calls(&self, operation: &str) -> Vec<String> {
        let prefix = format!("{}:", operation);
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

/// Configurable mock extractor
pub struct MockExtractor {
    pub name: String,
    pub depends_on: Vec<String>,
    pub should_fail_configure: bool,
    pub should_fail_validate: bool,
    pub should_fail_cleanup: bool,
    pub log: CallLog,
    base: PluginBase,
}

impl MockExtractor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            depends_on: Vec::new(),
            should_fail_configure: false,
            should_fail_validate: false,
            should_fail_cleanup: false,
            log: CallLog::new(),
            base: PluginBase::new(),
        }
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.depends_on = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_failure_modes(mut self, fail_configure: bool, fail_validate: bool) -> Self {
        self.should_fail_configure = fail_configure;
        self.should_fail_validate = fail_validate;
        self
    }

    pub fn with_failing_cleanup(mut self) -> Self {
        self.should_fail_cleanup = true;
        self
    }

    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = log.clone();
        self
    }

    pub fn boxed(self) -> Box<dyn Extractor> {
        Box::new(self)
    }
}

#[async_trait::async_trait]
impl Plugin for MockExtractor {
    fn plugin_info(&self) -> PluginInfo {
        let deps: Vec<&str> = self.depends_on.iter().map(String::as_str).collect();
        PluginInfo::new(&self.name, "1.0.0", "Mock extractor for testing").depends_on(&deps)
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }

    async fn configure(&mut self, config: &Table, _env: &PluginEnvironment) -> PluginResult<()> {
        self.log.push(format!("configure:{}", self.name));
        if self.should_fail_configure {
            return Err(PluginError::Generic {
                message: format!("{} refused its configuration", self.name),
            });
        }
        let info = self.plugin_info();
        self.base.apply_config(&info, config)
    }

    async fn validate(&self) -> PluginResult<()> {
        self.log.push(format!("validate:{}", self.name));
        if self.should_fail_validate {
            return Err(PluginError::Validation {
                plugin_name: self.name.clone(),
                errors: vec![
                    "api_key is missing".to_string(),
                    "endpoint unreachable".to_string(),
                ],
            });
        }
        Ok(())
    }

    async fn cleanup(&mut self) -> PluginResult<()> {
        self.log.push(format!("cleanup:{}", self.name));
        if self.should_fail_cleanup {
            return Err(PluginError::Execution {
                plugin_name: self.name.clone(),
                operation: "cleanup".to_string(),
                cause: "temp dir busy".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Extractor for MockExtractor {
    /// "generic" handles everything; others handle sources containing their name
    fn can_handle(&self, source: &str) -> bool {
        self.name == "generic" || source.contains(&self.name)
    }

    async fn extract(&self, source: &str) -> PluginResult<ExtractedContent> {
        Ok(ExtractedContent {
            title: format!("{} via {}", source, self.name),
            text: "mock transcript text".to_string(),
            ..Default::default()
        })
    }
}

/// Successful discovery result wrapping a mock extractor
pub fn loaded(mock: MockExtractor) -> PluginLoadResult<dyn Extractor> {
    let name = mock.name.clone();
    PluginLoadResult::loaded(&name, mock.boxed(), "builtin")
}

/// Failed discovery result
pub fn failed(name: &str, error: &str, hint: Option<&str>) -> PluginLoadResult<dyn Extractor> {
    PluginLoadResult::failed(
        name,
        error.to_string(),
        hint.map(str::to_string),
        "podext-test@0.1.0",
    )
}

// Provider types registered with the discovery macros

/// Extractor with a deferred construction path
pub struct EchoExtractor {
    pub deferred: bool,
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for EchoExtractor {
    fn plugin_info(&self) -> PluginInfo {
        Self::descriptor()
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }
}

#[async_trait::async_trait]
impl Extractor for EchoExtractor {
    fn can_handle(&self, source: &str) -> bool {
        source.starts_with("echo:")
    }

    async fn extract(&self, source: &str) -> PluginResult<ExtractedContent> {
        let mode = if self.deferred { "deferred" } else { "eager" };
        Ok(ExtractedContent {
            title: format!("{} ({})", source, mode),
            text: source.trim_start_matches("echo:").to_string(),
            ..Default::default()
        })
    }
}

impl Provider for EchoExtractor {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("echo", "0.1.0", "Echoes its input")
    }

    fn new_deferred() -> Option<PluginResult<Self>> {
        Some(Ok(Self {
            deferred: true,
            base: PluginBase::new(),
        }))
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            deferred: false,
            base: PluginBase::new(),
        })
    }
}

/// Renderer predating deferred construction
pub struct LegacyRenderer {
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for LegacyRenderer {
    fn plugin_info(&self) -> PluginInfo {
        Self::descriptor()
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }
}

impl Renderer for LegacyRenderer {
    fn format_name(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn render(&self, document: &RenderDocument) -> PluginResult<String> {
        Ok(document.title.clone())
    }
}

impl Provider for LegacyRenderer {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("legacy-text", "0.9.0", "Plain text renderer")
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}

/// Extractor written against an older contract revision
pub struct OldApiExtractor {
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for OldApiExtractor {
    fn plugin_info(&self) -> PluginInfo {
        Self::descriptor()
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }
}

#[async_trait::async_trait]
impl Extractor for OldApiExtractor {
    fn can_handle(&self, _source: &str) -> bool {
        false
    }

    async fn extract(&self, source: &str) -> PluginResult<ExtractedContent> {
        Err(PluginError::Execution {
            plugin_name: "old-api".to_string(),
            operation: "extract".to_string(),
            cause: format!("cannot handle {}", source),
        })
    }
}

impl Provider for OldApiExtractor {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("old-api", "0.1.0", "Targets a retired contract").with_api_version("0.9")
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}

/// Extractor whose descriptor is missing its version
pub struct UnversionedExtractor {
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for UnversionedExtractor {
    fn plugin_info(&self) -> PluginInfo {
        Self::descriptor()
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }
}

#[async_trait::async_trait]
impl Extractor for UnversionedExtractor {
    fn can_handle(&self, _source: &str) -> bool {
        false
    }

    async fn extract(&self, _source: &str) -> PluginResult<ExtractedContent> {
        Ok(ExtractedContent::default())
    }
}

impl Provider for UnversionedExtractor {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("unversioned", "", "Descriptor without version")
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}

/// Transcriber whose native runtime is not compiled in
pub struct GpuTranscriber {
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for GpuTranscriber {
    fn plugin_info(&self) -> PluginInfo {
        Self::descriptor()
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }
}

#[async_trait::async_trait]
impl Transcriber for GpuTranscriber {
    fn supports_format(&self, extension: &str) -> bool {
        extension == "wav"
    }

    async fn transcribe(&self, _audio: &Path) -> PluginResult<Transcript> {
        Ok(Transcript::default())
    }
}

impl Provider for GpuTranscriber {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("local-gpu", "0.2.0", "On-device transcription")
    }

    fn create() -> PluginResult<Self> {
        Err(PluginError::MissingDependency {
            dependency: "whisper-rs".to_string(),
            message: "the whisper runtime is not compiled into this build".to_string(),
        })
    }
}

crate::provider!(Extractor => EchoExtractor, "podext_test::EchoExtractor");
crate::provider!(Renderer => LegacyRenderer, "podext_test::LegacyRenderer");
crate::provider!(Extractor => OldApiExtractor, "podext_test::OldApiExtractor");
crate::provider!(Extractor => UnversionedExtractor, "podext_test::UnversionedExtractor");
crate::provider!(Transcriber => GpuTranscriber, "podext_test::GpuTranscriber");

crate::declare_provider!("extractors", "echo" => "podext_test::EchoExtractor");
crate::declare_provider!("renderers", "legacy-text" => "podext_test::LegacyRenderer");
