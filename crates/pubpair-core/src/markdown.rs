//! Utilities to render changelog Markdown consistently.

/// Format a one-line changelog entry as a Markdown list item.
pub fn format_markdown_list_item(message: &str) -> String {
    format!("- {message}\n")
}

/// Heading of a changelog section. Only the `## [<version>]` part is used to
/// detect an existing section.
pub fn format_version_heading(version: &str, date: Option<&str>) -> String {
    match date {
        Some(date) => format!("## [{version}] - {date}"),
        None => format!("## [{version}]"),
    }
}
