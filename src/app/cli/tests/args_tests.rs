//! Tests for command line parsing

use crate::app::cli::args::*;
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(args).unwrap()
}

#[test]
fn test_plugins_command_with_globals() {
    let args = parse(&[
        "podext",
        "--log-level",
        "debug",
        "--plugin-dir",
        "/opt/podext/plugins",
        "plugins",
        "--group",
        "renderers",
        "--show-broken",
    ]);

    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.plugin_dir, Some(PathBuf::from("/opt/podext/plugins")));
    assert_eq!(
        args.command,
        Command::Plugins(PluginsArgs {
            group: Some("renderers".to_string()),
            show_broken: true,
        })
    );
}

#[test]
fn test_global_flags_after_subcommand() {
    let args = parse(&["podext", "plugins", "--log-format", "json", "--no-color"]);
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.color_override(), Some(false));
}

#[test]
fn test_unknown_group_rejected() {
    assert!(Args::try_parse_from(["podext", "plugins", "--group", "podcasts"]).is_err());
}

#[test]
fn test_invalid_log_level_rejected() {
    assert!(Args::try_parse_from(["podext", "--log-level", "loud", "plugins"]).is_err());
}

#[test]
fn test_subcommand_required() {
    assert!(Args::try_parse_from(["podext"]).is_err());
}

#[test]
fn test_color_override() {
    assert_eq!(parse(&["podext", "plugins"]).color_override(), None);
    assert_eq!(parse(&["podext", "--color", "plugins"]).color_override(), Some(true));
    // last flag wins
    assert_eq!(
        parse(&["podext", "--color", "--no-color", "plugins"]).color_override(),
        Some(false)
    );
    assert_eq!(
        parse(&["podext", "--no-color", "--color", "plugins"]).color_override(),
        Some(true)
    );
}

#[test]
fn test_exclusions_accept_lists_and_repeats() {
    let args = parse(&[
        "podext",
        "--exclude-plugin",
        "youtube, whisper",
        "--exclude-plugin",
        "rss",
        "--exclude-plugin",
        "youtube",
        "plugins",
    ]);
    assert_eq!(args.exclusions(), vec!["youtube", "whisper", "rss"]);
}

#[test]
fn test_split_names_drops_empties() {
    let values = vec![",a,,b ,".to_string(), " ".to_string()];
    assert_eq!(split_names(&values), vec!["a", "b"]);
}
