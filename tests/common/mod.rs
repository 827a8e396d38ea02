//! Shared providers for integration tests
//!
//! Registered through the public macros exactly as a third-party provider
//! crate linked into the binary would do it.

#![allow(dead_code)]

use podext::plugin::api::{
    ConfigSchema, ExtractedContent, Extractor, FieldKind, Plugin, PluginBase, PluginError,
    PluginInfo, PluginResult, Provider,
};
use std::fs;
use std::path::Path;

/// Extractor for RSS feeds; needs an `endpoint` setting
pub struct FeedExtractor {
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for FeedExtractor {
    fn plugin_info(&self) -> PluginInfo {
        Self::descriptor()
    }

    fn base(&self) -> &PluginBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PluginBase {
        &mut self.base
    }

    async fn validate(&self) -> PluginResult<()> {
        let endpoint = self
            .config()?
            .get("endpoint")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if endpoint.starts_with("https://") {
            Ok(())
        } else {
            Err(PluginError::Validation {
                plugin_name: "feed".to_string(),
                errors: vec![format!("endpoint '{}' is not https", endpoint)],
            })
        }
    }
}

#[async_trait::async_trait]
impl Extractor for FeedExtractor {
    fn can_handle(&self, source: &str) -> bool {
        source.ends_with(".rss") || source.ends_with("/feed")
    }

    async fn extract(&self, source: &str) -> PluginResult<ExtractedContent> {
        Ok(ExtractedContent {
            title: format!("Feed {}", source),
            ..Default::default()
        })
    }
}

impl Provider for FeedExtractor {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("feed", "0.4.0", "RSS and Atom feeds")
            .with_author("Podext Contributors")
            .with_schema(ConfigSchema::new().required("endpoint", FieldKind::String))
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}

/// Extractor that needs `feed` configured first
pub struct ChaptersExtractor {
    base: PluginBase,
}

#[async_trait::async_trait]
impl Plugin for ChaptersExtractor {
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
impl Extractor for ChaptersExtractor {
    fn can_handle(&self, source: &str) -> bool {
        source.ends_with(".rss")
    }

    async fn extract(&self, source: &str) -> PluginResult<ExtractedContent> {
        Ok(ExtractedContent {
            title: format!("Chapters of {}", source),
            ..Default::default()
        })
    }
}

impl Provider for ChaptersExtractor {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("chapters", "0.1.0", "Chapter markers from feeds").depends_on(&["feed"])
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}

podext::provider!(Extractor => FeedExtractor, "podext_feeds::FeedExtractor");
podext::provider!(Extractor => ChaptersExtractor, "podext_feeds::ChaptersExtractor");

pub const FEEDS_MANIFEST: &str = r#"
[package]
name = "podext-feeds"
version = "0.4.0"

[providers.extractors]
feed = "podext_feeds::FeedExtractor"
chapters = "podext_feeds::ChaptersExtractor"
"#;

/// Write `podext-feeds.toml` into `dir`
pub fn write_feeds_manifest(dir: &Path) {
    fs::write(dir.join("podext-feeds.toml"), FEEDS_MANIFEST).unwrap();
}
