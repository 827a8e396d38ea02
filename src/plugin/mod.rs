//! Plugin System Module
//!
//! Discovers capability providers, registers them per capability group,
//! orders them by declared dependencies and configures them.

// Internal modules - all access should go through api module
pub(crate) mod builtin;
pub(crate) mod capabilities;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod loader;
pub(crate) mod manifest;
pub(crate) mod registry;
pub(crate) mod schema;
pub(crate) mod settings;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod tests;
