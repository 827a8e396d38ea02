//! Application startup
//!
//! Parse arguments, merge the configuration file, start logging, then run
//! the requested command. Returns the process exit code.

use super::cli::args::{Args, Command, PluginsArgs};
use super::cli::config::{PodextConfig, Settings};
use super::cli::display::{display_plugin_table, rows_for_group, PluginRow};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::version::{build_time, get_api_version, git_hash};
use crate::plugin::api::{
    cleanup_all, load_all, priority, Extractors, LoadReport, PluginEnvironment, PluginLoader,
    PluginResult, PluginSet, Renderers, Transcribers, EXTRACTORS, RENDERERS, TRANSCRIBERS,
};
use clap::Parser;

pub async fn startup() -> i32 {
    let args = Args::parse();

    let config = match PodextConfig::load(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let settings = Settings::from_sources(&args, config);

    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        settings.log_file.as_deref(),
        settings.use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return 1;
    }

    log::debug!(
        "podext {} (plugin API {}, built {} from {})",
        env!("CARGO_PKG_VERSION"),
        get_api_version(),
        build_time(),
        git_hash()
    );

    match &args.command {
        Command::Plugins(plugins_args) => list_plugins(&settings, plugins_args).await,
    }
}

/// Load the requested groups, print the listing and clean up.
/// Exit code 1 if any group failed as a whole.
async fn list_plugins(settings: &Settings, args: &PluginsArgs) -> i32 {
    let loader = PluginLoader::new(
        settings.plugins.clone(),
        PluginEnvironment::from_process(),
        settings.discovery_config(),
    );
    let mut set = PluginSet::new();

    let outcomes = load_selected(&loader, &mut set, args.group.as_deref()).await;

    let mut exit_code = 0;
    let mut rows: Vec<PluginRow> = Vec::new();
    for (group, outcome) in &outcomes {
        let report = match outcome {
            Ok(report) => Some(report),
            Err(e) => {
                log_error_with_context(e, &format!("Loading {}", group));
                exit_code = 1;
                None
            }
        };
        rows.extend(group_rows(&set, group, report));
    }

    display_plugin_table(&rows, args.show_broken, settings.use_color);

    let cleaned = cleanup_all(&mut set).await;
    log::debug!("Cleaned up {} plugin(s)", cleaned);
    exit_code
}

async fn load_selected(
    loader: &PluginLoader,
    set: &mut PluginSet,
    group: Option<&str>,
) -> Vec<(&'static str, PluginResult<LoadReport>)> {
    let default_priority = priority::BUILTIN;
    match group {
        None => load_all(loader, set, default_priority).await,
        Some(EXTRACTORS) => vec![(
            EXTRACTORS,
            loader
                .load_group::<Extractors>(&mut set.extractors, default_priority)
                .await,
        )],
        Some(TRANSCRIBERS) => vec![(
            TRANSCRIBERS,
            loader
                .load_group::<Transcribers>(&mut set.transcribers, default_priority)
                .await,
        )],
        Some(RENDERERS) => vec![(
            RENDERERS,
            loader
                .load_group::<Renderers>(&mut set.renderers, default_priority)
                .await,
        )],
        Some(other) => {
            log::warn!("Unknown capability group '{}'", other);
            Vec::new()
        }
    }
}

fn group_rows(set: &PluginSet, group: &str, report: Option<&LoadReport>) -> Vec<PluginRow> {
    match group {
        EXTRACTORS => rows_for_group(group, &set.extractors, report),
        TRANSCRIBERS => rows_for_group(group, &set.transcribers, report),
        RENDERERS => rows_for_group(group, &set.renderers, report),
        _ => Vec::new(),
    }
}
