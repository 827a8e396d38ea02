//! Built-in providers
//!
//! Compiled into the binary and declared under the `builtin` source, so they
//! are discovered without any manifest.

pub mod markdown;
pub mod text;

pub use markdown::MarkdownRenderer;
pub use text::PlainTextRenderer;

use crate::plugin::capabilities::RENDERERS;

crate::provider!(Renderer => MarkdownRenderer, "podext::builtin::MarkdownRenderer");
crate::provider!(Renderer => PlainTextRenderer, "podext::builtin::PlainTextRenderer");

crate::declare_provider!(RENDERERS, "markdown" => "podext::builtin::MarkdownRenderer");
crate::declare_provider!(RENDERERS, "text" => "podext::builtin::PlainTextRenderer");
