//! Reading and editing `pubspec.yaml` manifests.
//!
//! Reads go through `serde_yaml`. Writes are targeted line edits that replace a
//! single scalar (the top-level `version`, or one entry of `dependencies`) so the
//! rest of the document keeps its quoting, comments and ordering.

use crate::errors::{PubPairError, Result, io_error_with_path};
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::{Path, PathBuf};

const DEPENDENCIES_KEY: &str = "dependencies";

/// A loaded pubspec: the raw text plus its parsed form.
#[derive(Debug, Clone)]
pub struct Pubspec {
    path: PathBuf,
    text: String,
    value: YamlValue,
}

impl Pubspec {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PubPairError::Io(io_error_with_path(e, path)))?;
        Self::parse(path, text)
    }

    pub fn parse(path: &Path, text: String) -> Result<Self> {
        let value = parse_yaml(path, &text)?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            value,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The declared `version`, as written.
    pub fn version(&self) -> Result<String> {
        self.value
            .get("version")
            .and_then(scalar_to_string)
            .ok_or_else(|| {
                PubPairError::Manifest(format!(
                    "{} is missing a version field",
                    self.path.display()
                ))
            })
    }

    /// The constraint recorded for `name` under `dependencies`, if any.
    pub fn dependency(&self, name: &str) -> Option<String> {
        let entry = self.value.get(DEPENDENCIES_KEY)?.get(name)?;
        match scalar_to_string(entry) {
            Some(text) => Some(text),
            None if entry.is_null() => Some(String::new()),
            None => serde_yaml::to_string(entry)
                .ok()
                .map(|text| text.trim().to_string()),
        }
    }

    /// Replace the top-level `version`. Returns the previous value.
    pub fn set_version(&mut self, new_version: &str) -> Result<String> {
        let old = self.version()?;
        let updated = replace_top_level_scalar(&self.text, "version", new_version)
            .ok_or_else(|| {
                PubPairError::Manifest(format!(
                    "could not locate a version line in {}",
                    self.path.display()
                ))
            })?;
        self.reload(updated)?;
        Ok(old)
    }

    /// Replace the constraint of `dependencies.<name>`. Returns the previous
    /// constraint, or `None` (leaving the document untouched) when the
    /// dependency is not declared. A null or mapping entry (hosted, path, git)
    /// becomes the plain constraint.
    pub fn set_dependency(&mut self, name: &str, constraint: &str) -> Result<Option<String>> {
        let Some(old) = self.dependency(name) else {
            return Ok(None);
        };
        let updated = replace_nested_scalar(&self.text, DEPENDENCIES_KEY, name, constraint)
            .ok_or_else(|| {
                PubPairError::Manifest(format!(
                    "could not locate dependency '{}' in {}",
                    name,
                    self.path.display()
                ))
            })?;
        self.reload(updated)?;
        Ok(Some(old))
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.text)
            .map_err(|e| PubPairError::Io(io_error_with_path(e, &self.path)))
    }

    fn reload(&mut self, text: String) -> Result<()> {
        self.value = parse_yaml(&self.path, &text)?;
        self.text = text;
        Ok(())
    }
}

fn parse_yaml(path: &Path, text: &str) -> Result<YamlValue> {
    serde_yaml::from_str(text).map_err(|e| {
        PubPairError::Manifest(format!("failed to parse {}: {}", path.display(), e))
    })
}

fn scalar_to_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split a line into its content and its line terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// If `body` declares `key:` after its indentation, returns the byte offset just
/// past the colon.
fn key_value_offset(body: &str, key: &str) -> Option<usize> {
    let indent = indentation(body);
    let rest = &body[indent..];
    let unquoted = rest.strip_prefix(key).map(|after| (after, key.len()));
    let quoted = [('"', '"'), ('\'', '\'')].iter().find_map(|(open, close)| {
        let inner = rest.strip_prefix(*open)?.strip_prefix(key)?.strip_prefix(*close)?;
        Some((inner, key.len() + 2))
    });
    let (after, consumed) = unquoted.or(quoted)?;
    let after_colon = after.trim_start_matches([' ', '\t']).strip_prefix(':')?;
    if !(after_colon.is_empty() || after_colon.starts_with([' ', '\t'])) {
        return None;
    }
    Some(indent + consumed + (after.len() - after_colon.len()))
}

/// Rewrite the scalar that follows `offset` in `body`, keeping its quote style
/// and any trailing comment. Returns `None` when there is no inline scalar.
fn rewrite_scalar(body: &str, offset: usize, new_value: &str) -> Option<String> {
    let tail = &body[offset..];
    let leading = tail.len() - tail.trim_start_matches([' ', '\t']).len();
    let value_start = offset + leading;
    let value = &body[value_start..];

    let (quote, value_len) = match value.chars().next()? {
        '#' => return None,
        q @ ('"' | '\'') => {
            let close = value[1..].find(q)?;
            (Some(q), close + 2)
        }
        _ => {
            let end = value.find(" #").or_else(|| value.find("\t#")).unwrap_or(value.len());
            let trimmed_len = value[..end].trim_end().len();
            if trimmed_len == 0 {
                return None;
            }
            (None, trimmed_len)
        }
    };

    let mut out = String::with_capacity(body.len() + new_value.len());
    out.push_str(&body[..value_start]);
    match quote {
        Some(q) => {
            out.push(q);
            out.push_str(new_value);
            out.push(q);
        }
        None => out.push_str(new_value),
    }
    out.push_str(&value[value_len..]);
    Some(out)
}

/// Put `new_value` after the colon of a key whose value is empty (null) or
/// continues on the following lines (a block mapping). A trailing comment stays.
fn inline_scalar(body: &str, offset: usize, new_value: &str) -> Option<String> {
    let rest = body[offset..].trim();
    if rest.is_empty() {
        Some(format!("{} {}", &body[..offset], new_value))
    } else if rest.starts_with('#') {
        Some(format!("{} {} {}", &body[..offset], new_value, rest))
    } else {
        None
    }
}

fn replace_top_level_scalar(text: &str, key: &str, new_value: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut replaced = false;
    for line in text.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);
        if !replaced && indentation(body) == 0 {
            if let Some(offset) = key_value_offset(body, key) {
                out.push_str(&rewrite_scalar(body, offset, new_value)?);
                out.push_str(terminator);
                replaced = true;
                continue;
            }
        }
        out.push_str(line);
    }
    replaced.then_some(out)
}

fn replace_nested_scalar(
    text: &str,
    section: &str,
    key: &str,
    new_value: &str,
) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut in_section = false;
    let mut child_indent: Option<usize> = None;
    let mut replaced = false;
    // Children of a block value that was just replaced by a scalar.
    let mut dropping_below: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);
        if let Some(level) = dropping_below {
            if body.trim().is_empty() {
                out.push_str(line);
                continue;
            }
            if indentation(body) > level {
                continue;
            }
            dropping_below = None;
        }
        if replaced || is_blank_or_comment(body) {
            out.push_str(line);
            continue;
        }

        let indent = indentation(body);
        if indent == 0 {
            in_section = key_value_offset(body, section).is_some();
            child_indent = None;
            out.push_str(line);
            continue;
        }

        if in_section {
            let level = *child_indent.get_or_insert(indent);
            if indent == level
                && let Some(offset) = key_value_offset(body, key)
            {
                match rewrite_scalar(body, offset, new_value) {
                    Some(rewritten) => out.push_str(&rewritten),
                    None => {
                        out.push_str(&inline_scalar(body, offset, new_value)?);
                        dropping_below = Some(indent);
                    }
                }
                out.push_str(terminator);
                replaced = true;
                continue;
            }
        }
        out.push_str(line);
    }

    replaced.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEN_PUBSPEC: &str = r#"name: dart_object_extension_gen
description: Code generator for dart_object_extension.
version: 0.3.0 # bumped by sync-version
repository: https://github.com/example/dart_object_extension

environment:
  sdk: ">=3.0.0 <4.0.0"

dependencies:
  analyzer: '>=6.0.0 <8.0.0'
  build: ^2.4.0
  dart_object_extension: "^0.3.0"
  source_gen: ^1.5.0

dev_dependencies:
  dart_object_extension: ^0.1.0
  test: ^1.24.0
"#;

    fn gen_pubspec() -> Pubspec {
        Pubspec::parse(Path::new("gen/pubspec.yaml"), GEN_PUBSPEC.to_string()).unwrap()
    }

    #[test]
    fn reads_fields() {
        let spec = gen_pubspec();
        assert_eq!(spec.version().unwrap(), "0.3.0");
        assert_eq!(
            spec.dependency("dart_object_extension").as_deref(),
            Some("^0.3.0")
        );
        assert_eq!(spec.dependency("missing"), None);
    }

    #[test]
    fn missing_version_is_an_error() {
        let spec = Pubspec::parse(Path::new("p.yaml"), "name: x\n".to_string()).unwrap();
        let err = spec.version().unwrap_err();
        assert!(err.to_string().contains("missing a version field"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = Pubspec::parse(Path::new("p.yaml"), "name: [x\n".to_string()).unwrap_err();
        assert!(matches!(err, PubPairError::Manifest(_)));
    }

    #[test]
    fn set_version_preserves_everything_else() {
        let mut spec = gen_pubspec();
        let old = spec.set_version("0.4.0").unwrap();
        assert_eq!(old, "0.3.0");
        assert_eq!(spec.version().unwrap(), "0.4.0");
        assert_eq!(
            spec.text(),
            GEN_PUBSPEC.replace(
                "version: 0.3.0 # bumped by sync-version",
                "version: 0.4.0 # bumped by sync-version"
            )
        );
    }

    #[test]
    fn set_dependency_only_touches_runtime_dependencies() {
        let mut spec = gen_pubspec();
        let old = spec
            .set_dependency("dart_object_extension", "^0.4.0")
            .unwrap();
        assert_eq!(old.as_deref(), Some("^0.3.0"));
        assert_eq!(
            spec.text(),
            GEN_PUBSPEC.replace(
                "dart_object_extension: \"^0.3.0\"",
                "dart_object_extension: \"^0.4.0\""
            )
        );
        assert!(spec.text().contains("  dart_object_extension: ^0.1.0\n"));
    }

    #[test]
    fn set_dependency_keeps_single_quotes() {
        let text = "name: a\nversion: 1.0.0\ndependencies:\n  core: '^1.0.0'\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        spec.set_dependency("core", "^2.0.0").unwrap();
        assert_eq!(
            spec.text(),
            "name: a\nversion: 1.0.0\ndependencies:\n  core: '^2.0.0'\n"
        );
    }

    #[test]
    fn set_dependency_without_entry_is_a_no_op() {
        let text = "name: a\nversion: 1.0.0\ndependencies:\n  meta: ^1.0.0\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        assert_eq!(spec.set_dependency("core", "^2.0.0").unwrap(), None);
        assert_eq!(spec.text(), text);
    }

    #[test]
    fn set_dependency_replaces_null_entry() {
        let text = "name: a\nversion: 1.0.0\ndependencies:\n  core:\n  meta: ^1.0.0\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        let old = spec.set_dependency("core", "^2.0.0").unwrap();
        assert_eq!(old.as_deref(), Some(""));
        assert_eq!(
            spec.text(),
            "name: a\nversion: 1.0.0\ndependencies:\n  core: ^2.0.0\n  meta: ^1.0.0\n"
        );
        assert_eq!(spec.dependency("core").as_deref(), Some("^2.0.0"));
    }

    #[test]
    fn set_dependency_replaces_mapping_entry() {
        let text = "name: a\nversion: 1.0.0\ndependencies:\n  core: # local\n    path: ../core\n\n    # pinned\n  meta: ^1.0.0\ndev_dependencies:\n  test: ^1.24.0\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        let old = spec.set_dependency("core", "^2.0.0").unwrap();
        assert_eq!(old.as_deref(), Some("path: ../core"));
        assert_eq!(
            spec.text(),
            "name: a\nversion: 1.0.0\ndependencies:\n  core: ^2.0.0 # local\n\n  meta: ^1.0.0\ndev_dependencies:\n  test: ^1.24.0\n"
        );
        assert_eq!(spec.dependency("meta").as_deref(), Some("^1.0.0"));
    }

    #[test]
    fn set_dependency_rejects_flow_style_section() {
        let text = "name: a\nversion: 1.0.0\ndependencies: {core: ^1.0.0}\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        let err = spec.set_dependency("core", "^2.0.0").unwrap_err();
        assert!(err.to_string().contains("could not locate dependency 'core'"));
        assert_eq!(spec.text(), text);
    }

    #[test]
    fn preserves_crlf_line_endings() {
        let text = "name: a\r\nversion: \"1.0.0\"\r\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        spec.set_version("1.1.0").unwrap();
        assert_eq!(spec.text(), "name: a\r\nversion: \"1.1.0\"\r\n");
    }

    #[test]
    fn ignores_nested_version_keys() {
        let text = "name: a\nenvironment:\n  version: 9.9.9\nversion: 1.0.0\n";
        let mut spec = Pubspec::parse(Path::new("p.yaml"), text.to_string()).unwrap();
        spec.set_version("1.0.1").unwrap();
        assert_eq!(
            spec.text(),
            "name: a\nenvironment:\n  version: 9.9.9\nversion: 1.0.1\n"
        );
    }

    #[test]
    fn save_and_load_roundtrip_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pubspec.yaml");
        fs::write(&path, GEN_PUBSPEC).unwrap();

        let mut spec = Pubspec::load(&path).unwrap();
        spec.set_version("1.0.0").unwrap();
        spec.save().unwrap();

        let reloaded = Pubspec::load(&path).unwrap();
        assert_eq!(reloaded.version().unwrap(), "1.0.0");
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope/pubspec.yaml");
        let err = Pubspec::load(&path).unwrap_err();
        assert!(err.to_string().contains("nope/pubspec.yaml"));
    }
}
