use crate::errors::{PubPairError, Result};
use crate::types::CommitRecord;
use std::path::Path;
use std::process::Command;

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%P%x1f%B%x1e";

/// Commit-message marker left by earlier version bumps.
pub fn version_bump_marker(version: &str) -> String {
    format!("Update Version {version}")
}

fn git(repo_root: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_root);
    cmd
}

fn run_git(repo_root: &Path, args: &[&str]) -> Result<String> {
    let output = git(repo_root)
        .args(args)
        .output()
        .map_err(|e| PubPairError::Git(format!("failed to invoke git: {e}")))?;
    if !output.status.success() {
        return Err(PubPairError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Resolve a tag to the commit it points at, if the tag exists.
pub fn tag_commit(repo_root: &Path, tag: &str) -> Result<Option<String>> {
    let spec = format!("refs/tags/{tag}^{{commit}}");
    let output = git(repo_root)
        .args(["rev-parse", "--verify", "--quiet", &spec])
        .output()
        .map_err(|e| PubPairError::Git(format!("failed to invoke git: {e}")))?;
    if !output.status.success() {
        return Ok(None);
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if sha.is_empty() { None } else { Some(sha) })
}

/// Locate the commit marking the start of `version`'s development window.
///
/// Looks for a tag named `<version>` or `v<version>` first, then for an
/// `Update Version <version>` commit among the last `scan_depth` commits.
pub fn find_version_base_ref(
    repo_root: &Path,
    version: &str,
    scan_depth: usize,
) -> Result<Option<String>> {
    for tag in [version.to_string(), format!("v{version}")] {
        if let Some(sha) = tag_commit(repo_root, &tag)? {
            tracing::debug!(%tag, %sha, "base ref from tag");
            return Ok(Some(sha));
        }
    }

    let marker = version_bump_marker(version);
    let found = log_entries(repo_root, &[&format!("--max-count={scan_depth}")])?
        .into_iter()
        .find(|entry| entry.summary.contains(&marker))
        .map(|entry| entry.id);
    if let Some(sha) = &found {
        tracing::debug!(%sha, %marker, "base ref from bump commit");
    }
    Ok(found)
}

/// Commits reachable from HEAD but not from `base`, newest first.
pub fn commits_since(repo_root: &Path, base: &str) -> Result<Vec<CommitRecord>> {
    let range = format!("{base}..HEAD");
    with_paths(repo_root, log_entries(repo_root, &[&range])?)
}

/// The last `count` commits reachable from HEAD, newest first.
pub fn recent_commits(repo_root: &Path, count: usize) -> Result<Vec<CommitRecord>> {
    let limit = format!("--max-count={count}");
    with_paths(repo_root, log_entries(repo_root, &[&limit])?)
}

/// Paths changed by `id` relative to `parent`. A renamed or copied file is
/// reported under its pre-image path only.
pub fn changed_paths(repo_root: &Path, parent: &str, id: &str) -> Result<Vec<String>> {
    let out = run_git(
        repo_root,
        &["diff", "--name-status", "-M", "-z", parent, id],
    )?;
    Ok(parse_name_status(&out))
}

/// Parse `--name-status -z` output: a status field, then one path, or two
/// (old, new) for `R`/`C` entries.
fn parse_name_status(out: &str) -> Vec<String> {
    let mut fields = out.split('\0').filter(|f| !f.is_empty());
    let mut paths = Vec::new();
    while let Some(status) = fields.next() {
        let Some(path) = fields.next() else { break };
        if status.starts_with(['R', 'C']) {
            fields.next();
        }
        paths.push(path.to_string());
    }
    paths
}

struct LogEntry {
    id: String,
    first_parent: Option<String>,
    summary: String,
}

fn log_entries(repo_root: &Path, extra: &[&str]) -> Result<Vec<LogEntry>> {
    let mut args = vec!["log", LOG_FORMAT];
    args.extend_from_slice(extra);
    let out = run_git(repo_root, &args)?;
    Ok(parse_log(&out))
}

fn parse_log(out: &str) -> Vec<LogEntry> {
    out.split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.is_empty())
        .filter_map(|record| {
            let mut fields = record.splitn(3, FIELD_SEP);
            let id = fields.next()?.trim().to_string();
            let parents = fields.next()?;
            let message = fields.next().unwrap_or_default();
            Some(LogEntry {
                id,
                first_parent: parents.split_whitespace().next().map(str::to_string),
                summary: message.trim().lines().next().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

fn with_paths(repo_root: &Path, entries: Vec<LogEntry>) -> Result<Vec<CommitRecord>> {
    entries
        .into_iter()
        .map(|entry| {
            let paths = match &entry.first_parent {
                Some(parent) => changed_paths(repo_root, parent, &entry.id)?,
                None => Vec::new(),
            };
            Ok(CommitRecord {
                id: entry.id,
                summary: entry.summary,
                paths,
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_repo {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::Command;

    /// Throwaway git repository for tests.
    pub(crate) struct TestRepo {
        root: PathBuf,
        _temp_dir: tempfile::TempDir,
    }

    impl TestRepo {
        pub(crate) fn new() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let root = temp_dir.path().to_path_buf();
            let repo = Self {
                root,
                _temp_dir: temp_dir,
            };
            repo.git(&["init", "-q"]);
            repo
        }

        pub(crate) fn root(&self) -> &Path {
            &self.root
        }

        pub(crate) fn git(&self, args: &[&str]) -> String {
            let output = Command::new("git")
                .arg("-C")
                .arg(&self.root)
                .args([
                    "-c",
                    "user.name=Test",
                    "-c",
                    "user.email=test@example.com",
                    "-c",
                    "commit.gpgsign=false",
                    "-c",
                    "tag.gpgsign=false",
                ])
                .args(args)
                .output()
                .expect("failed to run git");
            assert!(
                output.status.success(),
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }

        pub(crate) fn write(&self, rel: &str, content: &str) -> &Self {
            let path = self.root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
            self
        }

        /// Write the given files and commit them. Returns the new commit id.
        pub(crate) fn commit(&self, message: &str, files: &[(&str, &str)]) -> String {
            for (rel, content) in files {
                self.write(rel, content);
            }
            self.git(&["add", "-A"]);
            self.git(&["commit", "-q", "--allow-empty", "-m", message]);
            self.git(&["rev-parse", "HEAD"])
        }

        pub(crate) fn tag(&self, name: &str) {
            self.git(&["tag", name]);
        }
    }
}
