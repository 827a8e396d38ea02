//! Plugin listing output

use crate::core::styles::StyleRole;
use crate::plugin::api::{LoadReport, Plugin, PluginRegistry, PluginStatus};
use prettytable::{format, Cell, Row, Table};

/// One line of the plugin listing
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRow {
    pub group: String,
    pub name: String,
    pub version: Option<String>,
    pub status: PluginStatus,
    pub priority: Option<i32>,
    pub source: Option<String>,
    pub error: Option<String>,
    pub recovery_hint: Option<String>,
}

/// Rows for every registry entry plus names the configuration disabled
pub fn rows_for_group<T>(
    group: &str,
    registry: &PluginRegistry<T>,
    report: Option<&LoadReport>,
) -> Vec<PluginRow>
where
    T: ?Sized + Plugin,
{
    let mut rows: Vec<PluginRow> = registry
        .all_entries()
        .into_iter()
        .map(|entry| PluginRow {
            group: group.to_string(),
            name: entry.name().to_string(),
            version: entry.plugin().map(|p| p.plugin_info().version),
            status: entry.status(),
            priority: Some(entry.priority()),
            source: Some(entry.source().to_string()),
            error: entry.error().map(str::to_string),
            recovery_hint: entry.recovery_hint().map(str::to_string),
        })
        .collect();

    if let Some(report) = report {
        rows.extend(report.disabled.iter().map(|name| PluginRow {
            group: group.to_string(),
            name: name.clone(),
            version: None,
            status: PluginStatus::Disabled,
            priority: None,
            source: None,
            error: None,
            recovery_hint: None,
        }));
    }
    rows
}

fn status_role(status: PluginStatus) -> StyleRole {
    match status {
        PluginStatus::Loaded => StyleRole::Loaded,
        PluginStatus::Broken => StyleRole::Broken,
        PluginStatus::Disabled => StyleRole::Disabled,
    }
}

fn styled(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    if use_color {
        cell.style_spec(role.table_spec())
    } else {
        cell
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Build the listing. Error and hint columns appear only with `show_broken`.
pub fn build_plugin_table(rows: &[PluginRow], show_broken: bool, use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    let mut titles = vec!["Group", "Plugin", "Version", "Status", "Priority", "Source"];
    if show_broken {
        titles.extend(["Error", "Hint"]);
    }
    table.set_titles(Row::new(
        titles
            .into_iter()
            .map(|t| styled(t, StyleRole::Header, use_color))
            .collect(),
    ));

    for row in rows {
        let priority = row.priority.map(|p| p.to_string());
        let status = row.status.to_string();
        let mut cells = vec![
            Cell::new(&row.group),
            Cell::new(&row.name),
            Cell::new(or_dash(row.version.as_deref())),
            styled(&status, status_role(row.status), use_color),
            Cell::new(or_dash(priority.as_deref())),
            Cell::new(or_dash(row.source.as_deref())),
        ];
        if show_broken {
            cells.push(Cell::new(or_dash(row.error.as_deref())));
            cells.push(styled(
                or_dash(row.recovery_hint.as_deref()),
                StyleRole::Hint,
                use_color,
            ));
        }
        table.add_row(Row::new(cells));
    }
    table
}

/// Print the listing to stdout
pub fn display_plugin_table(rows: &[PluginRow], show_broken: bool, use_color: bool) {
    if rows.is_empty() {
        eprintln!("No plugins discovered.");
        return;
    }

    let table = build_plugin_table(rows, show_broken, use_color);
    if use_color {
        table.printstd();
    } else {
        print!("{}", table);
    }

    let broken = rows
        .iter()
        .filter(|r| r.status == PluginStatus::Broken)
        .count();
    if broken > 0 && !show_broken {
        eprintln!(
            "{} broken plugin(s); use --show-broken for details",
            broken
        );
    }
}
