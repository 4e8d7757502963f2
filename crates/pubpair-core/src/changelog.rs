use crate::classify::{Classification, classify_commits, deduplicate};
use crate::config::Config;
use crate::errors::{PubPairError, Result, io_error_with_path};
use crate::git;
use crate::markdown::{format_markdown_list_item, format_version_heading};
use crate::types::ProjectLayout;
use std::fs;
use std::path::Path;

/// Bullet used when a release has no attributable commits.
pub const FALLBACK_ENTRY: &str = "Update packages.";

/// What `update_changelog` did to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogUpdate {
    /// A new section with this many bullets was prepended.
    Written { entries: usize },
    /// The file already had a section for the version.
    AlreadyPresent,
}

/// Render a changelog section: heading, blank line, bullets, blank line.
pub fn render_section(version: &str, date: Option<&str>, entries: &[String]) -> String {
    let mut section = format_version_heading(version, date);
    section.push_str("\n\n");
    for entry in entries {
        section.push_str(&format_markdown_list_item(entry));
    }
    section.push('\n');
    section
}

/// Prepend a `## [<version>]` section to the changelog at `path`.
///
/// Entries are deduplicated first; an empty list becomes a single
/// "Update packages." bullet. Nothing is written when the file already
/// mentions `## [<version>]`.
pub fn update_changelog(
    path: &Path,
    version: &str,
    date: Option<&str>,
    entries: &[String],
) -> Result<ChangelogUpdate> {
    let mut entries = deduplicate(entries);
    if entries.is_empty() {
        entries.push(FALLBACK_ENTRY.to_string());
    }

    let existing = if path.exists() {
        fs::read_to_string(path).map_err(|e| PubPairError::Io(io_error_with_path(e, path)))?
    } else {
        String::new()
    };

    if existing.contains(&format_version_heading(version, None)) {
        return Ok(ChangelogUpdate::AlreadyPresent);
    }

    let mut combined = render_section(version, date, &entries);
    combined.push_str(&existing);
    fs::write(path, combined).map_err(|e| PubPairError::Io(io_error_with_path(e, path)))?;

    Ok(ChangelogUpdate::Written {
        entries: entries.len(),
    })
}

/// Collect the commits since the base reference of `current_version` and
/// classify them per package.
pub fn collect_entries(
    layout: &ProjectLayout,
    config: &Config,
    current_version: &str,
) -> Result<Classification> {
    let root = layout.root();
    let base_ref = git::find_version_base_ref(root, current_version, config.history_scan_depth)?;
    let commits = match &base_ref {
        Some(base) => {
            println!(
                "  Base ref for {}: {}",
                current_version,
                base.get(..8).unwrap_or(base)
            );
            git::commits_since(root, base)?
        }
        None => {
            println!(
                "  No base ref found for {}, using recent commits.",
                current_version
            );
            git::recent_commits(root, config.history_fallback_window)?
        }
    };
    Ok(classify_commits(&commits, &layout.source, &layout.dependent))
}

/// Generate the `new_version` section of both changelogs from git history.
///
/// `current_version` is the version still declared in the pubspecs; its base
/// reference scopes the commits that end up in the new section.
pub fn generate_changelogs(
    layout: &ProjectLayout,
    config: &Config,
    current_version: &str,
    new_version: &str,
) -> Result<()> {
    println!("\nGenerating changelogs ...");

    let classified = collect_entries(layout, config, current_version)?;
    let date = config
        .changelog_show_date
        .then(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    for (role, package) in layout.packages() {
        let entries = classified.entries(role);
        println!("\n  {}: {} commit(s) found", package.name, entries.len());
        for entry in entries {
            println!("    - {entry}");
        }
        report_update(
            &package.name,
            new_version,
            update_changelog(
                &layout.changelog_path(role),
                new_version,
                date.as_deref(),
                entries,
            )?,
        );
    }
    Ok(())
}

fn report_update(package: &str, version: &str, update: ChangelogUpdate) {
    match update {
        ChangelogUpdate::AlreadyPresent => {
            println!("  {package} CHANGELOG.md already has [{version}], skipped.")
        }
        ChangelogUpdate::Written { entries } => {
            println!("  {package} CHANGELOG.md updated ({entries} entries)")
        }
    }
}
