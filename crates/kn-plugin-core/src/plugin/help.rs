//! Plugin section of command help

use crate::plugin::types::PluginList;

/// Shown when a plugin cannot describe itself
pub const NO_DESCRIPTION: &str = "(no description available)";

const INDENT: &str = "  ";

/// Render one line per plugin: the command parts below the group,
/// hyphen-joined and padded, followed by the description.
///
/// Returns an empty string for an empty list; callers omit the section.
pub fn render(plugins: &PluginList, group_len: usize) -> String {
    let rows: Vec<(String, String)> = plugins
        .iter()
        .map(|plugin| {
            let parts = plugin.command_parts();
            let short = parts.get(group_len..).unwrap_or_default().join("-");
            let description = plugin
                .description()
                .unwrap_or_else(|_| NO_DESCRIPTION.to_string());
            (short, description)
        })
        .collect();

    let width = rows.iter().map(|(short, _)| short.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(short, description)| {
            format!("{}{:<width$}  {}", INDENT, short, description, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
