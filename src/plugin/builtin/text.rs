//! Plain text renderer

use crate::plugin::capabilities::{RenderDocument, Renderer};
use crate::plugin::error::PluginResult;
use crate::plugin::traits::{Plugin, PluginBase, Provider};
use crate::plugin::types::PluginInfo;

pub struct PlainTextRenderer {
    base: PluginBase,
}

fn underline(text: &str, mark: char) -> String {
    let width = text.chars().count();
    format!("{}\n{}\n", text, mark.to_string().repeat(width))
}

#[async_trait::async_trait]
impl Plugin for PlainTextRenderer {
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

impl Renderer for PlainTextRenderer {
    fn format_name(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn render(&self, document: &RenderDocument) -> PluginResult<String> {
        let mut out = underline(&document.title, '=');
        for (heading, body) in &document.sections {
            out.push('\n');
            out.push_str(&underline(heading, '-'));
            out.push_str(body);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Provider for PlainTextRenderer {
    fn descriptor() -> PluginInfo {
        PluginInfo::new("text", env!("CARGO_PKG_VERSION"), "Plain text documents")
    }

    fn create() -> PluginResult<Self> {
        Ok(Self {
            base: PluginBase::new(),
        })
    }
}
