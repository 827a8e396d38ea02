//! CLI module: argument parsing, configuration file and output

pub mod args;
pub mod config;
pub mod display;

#[cfg(test)]
mod tests;
