//! Command line arguments

use crate::core::styles::help_styles;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "podext")]
#[command(about = "Capability provider runtime for podcast processing")]
#[command(version)]
#[command(styles = help_styles(std::io::stdout().is_terminal()))]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Directory holding provider package manifests
    #[arg(short = 'p', long = "plugin-dir", value_name = "DIR", global = true)]
    pub plugin_dir: Option<PathBuf>,

    /// Plugins to exclude from discovery*
    #[arg(long = "exclude-plugin", value_name = "NAMES", action = ArgAction::Append, global = true)]
    pub plugin_exclusions: Vec<String>,

    /// Force coloured output
    #[arg(long = "color", overrides_with = "no_color", global = true)]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", overrides_with = "color", global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true,
          value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", global = true,
          value_parser = ["text", "simple", "ext", "json"])]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Discover, load and list capability providers
    Plugins(PluginsArgs),
}

#[derive(ClapArgs, Debug, Clone, Default, PartialEq)]
pub struct PluginsArgs {
    /// Only load this capability group
    #[arg(short = 'g', long = "group", value_name = "GROUP",
          value_parser = ["extractors", "transcribers", "renderers"])]
    pub group: Option<String>,

    /// Show error and recovery hint for broken plugins
    #[arg(short = 'b', long = "show-broken")]
    pub show_broken: bool,
}

impl Args {
    /// Explicit `--color`/`--no-color`, if either was given
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (_, true) => Some(false),
            (true, false) => Some(true),
            (false, false) => None,
        }
    }

    /// Exclusions with comma-separated values expanded
    pub fn exclusions(&self) -> Vec<String> {
        split_names(&self.plugin_exclusions)
    }
}

/// Split comma-separated values, trim them and drop empties and duplicates.
/// First occurrence wins.
pub fn split_names(values: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for value in values {
        for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}
