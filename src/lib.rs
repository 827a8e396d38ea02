pub mod app;
pub mod core;
pub mod plugin;

#[doc(hidden)]
pub use inventory as __inventory;
