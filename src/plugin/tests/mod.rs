//! Test modules for the plugin system
//!
//! Discovery against the providers registered in `utils`, and full group
//! loads through the loader.

pub(crate) mod utils;
