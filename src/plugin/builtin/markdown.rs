//! Markdown renderer

use crate::plugin::capabilities::{RenderDocument, Renderer};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::schema::{ConfigSchema, FieldKind};
use crate::plugin::traits::{Plugin, PluginBase, Provider};
use crate::plugin::types::PluginInfo;
use toml::Table;

const MAX_HEADING_LEVEL: usize = 5;

pub struct MarkdownRenderer {
    base: PluginBase,
}

impl MarkdownRenderer {
    fn heading_level(&self) -> PluginResult<usize> {
        let level = self
            .config()?
            .get("heading_level")
            .and_then(|v| v.as_integer())
            .unwrap_or(1);
        match usize::try_from(level) {
            Ok(l) if (1..=MAX_HEADING_LEVEL).contains(&l) => Ok(l),
            _ => Err(PluginError::Validation {
                plugin_name: self.plugin_info().name,
                errors: vec![format!(
                    "heading_level must be between 1 and {}, got {}",
                    MAX_HEADING_LEVEL, level
                )],
            }),
        }
    }

    fn include_metadata(&self) -> PluginResult<bool> {
        Ok(self
            .config()?
            .get("include_metadata")
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn escape(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '|') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    fn metadata_lines(metadata: &Table) -> String {
        metadata
            .iter()
            .map(|(key, value)| {
                let value = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                };
                format!("- **{}**: {}\n", Self::escape(key), Self::escape(&value))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Plugin for MarkdownRenderer {
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
        self.heading_level().map(|_| ())
    }
}

impl Renderer for MarkdownRenderer {
    fn format_name(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }

    fn render(&self, document: &RenderDocument) -> PluginResult<String> {
        let level = self.heading_level()?;
        let title_marks = "#".repeat(level);
        let section_marks = "#".repeat(level + 1);

        let mut out = format!("{} {}\n\n", title_marks, Self::escape(&document.title));
        if self.include_metadata()? && !document.metadata.is_empty() {
            out.push_str(&Self::metadata_lines(&document.metadata));
            out.push('\n');
        }
        for (heading, body) in &document.sections {
            out.push_str(&format!("{} {}\n\n{}\n\n", section_marks, Self::escape(heading), body));
        }
        Ok(out.trim_end().to_string() + "\n")
    }
}

impl Provider for MarkdownRenderer {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("markdown", env!("CARGO_PKG_VERSION"), "Markdown documents")
            .with_schema(
                ConfigSchema::new()
                    .with_default("heading_level", FieldKind::Integer, 1)
                    .with_default("include_metadata", FieldKind::Boolean, false),
            )
    }

    fn new_deferred() -> Option<PluginResult<Self>> {
        Some(Self::create())
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}
