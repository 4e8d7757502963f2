//! Attribution of commits to the source and dependent packages.
//!
//! Everything here is a pure function over commit summaries and changed paths,
//! so it works the same whatever produced the history.

use crate::types::{Affected, CommitRecord, PackageRole, PackageSpec};
use std::collections::HashSet;

/// Commits whose first line contains one of these never reach a changelog.
pub const SKIP_PATTERNS: &[&str] = &["Update Version", "Merge branch", "Merge pull request"];

const CONVENTIONAL_PREFIXES: &[&str] = &[
    "feat", "fix", "chore", "refactor", "docs", "test", "perf", "ci", "fixed",
];

/// Changelog entries per package, in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub source: Vec<String>,
    pub dependent: Vec<String>,
}

impl Classification {
    pub fn entries(&self, role: PackageRole) -> &[String] {
        match role {
            PackageRole::Source => &self.source,
            PackageRole::Dependent => &self.dependent,
        }
    }

    fn push(&mut self, affected: Affected, message: &str) {
        if affected.source {
            self.source.push(message.to_string());
        }
        if affected.dependent {
            self.dependent.push(message.to_string());
        }
    }
}

/// `true` for merge commits and earlier version bumps.
pub fn is_noise(summary: &str) -> bool {
    SKIP_PATTERNS.iter().any(|pattern| summary.contains(pattern))
}

/// Strip one leading conventional-commit prefix (`feat:`, `fix:`, ...) and the
/// whitespace after it. Matching is case-sensitive and anchored at the start.
pub fn format_commit_message(message: &str) -> &str {
    for prefix in CONVENTIONAL_PREFIXES {
        if let Some(rest) = message
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return rest.trim_start_matches(char::is_whitespace);
        }
    }
    message
}

/// Decide which packages a commit touches.
///
/// A path inside the dependent directory counts for the dependent package
/// only, even when that directory sits inside the source directory. Commits
/// with paths outside both packages count for both; commits without paths
/// count for neither.
pub fn classify_commit(
    summary: &str,
    paths: &[String],
    source: &PackageSpec,
    dependent: &PackageSpec,
) -> Affected {
    if is_noise(summary) || paths.is_empty() {
        return Affected::NONE;
    }

    let touches_source = paths
        .iter()
        .any(|p| source.contains_path(p) && !dependent.contains_path(p));
    let touches_dependent = paths.iter().any(|p| dependent.contains_path(p));

    match (touches_source, touches_dependent) {
        (false, false) => Affected::BOTH,
        (in_source, in_dependent) => Affected {
            source: in_source,
            dependent: in_dependent,
        },
    }
}

/// Classify a list of commits into per-package changelog entries.
pub fn classify_commits(
    commits: &[CommitRecord],
    source: &PackageSpec,
    dependent: &PackageSpec,
) -> Classification {
    let mut result = Classification::default();
    for commit in commits {
        let affected = classify_commit(&commit.summary, &commit.paths, source, dependent);
        if affected.is_empty() {
            tracing::debug!(commit = commit.short_id(), summary = %commit.summary, "skipped");
            continue;
        }
        result.push(affected, format_commit_message(&commit.summary));
    }
    result
}

/// Remove repeated entries, keeping the first occurrence of each.
pub fn deduplicate<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.as_ref())
        .filter(|entry| seen.insert(*entry))
        .map(str::to_string)
        .collect()
}
