use crate::errors::{PubPairError, Result};
use crate::types::{PackageRole, PackageSpec, ProjectLayout};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIR: &str = ".pubpair";
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_SOURCE_PACKAGE: &str = "dart_object_extension";
pub const DEFAULT_DEPENDENT_PACKAGE: &str = "dart_object_extension_gen";
pub const DEFAULT_REGISTRY_URL: &str = "https://pub.dev/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_SCAN_DEPTH: usize = 200;
pub const DEFAULT_FALLBACK_WINDOW: usize = 50;

/// Configuration for pubpair
#[derive(Debug, Clone)]
pub struct Config {
    pub source: PackageSpec,
    pub dependent: PackageSpec,
    pub changelog_show_date: bool,
    /// How many recent commits are scanned for an `Update Version <v>` commit.
    pub history_scan_depth: usize,
    /// How many recent commits are used when no base reference exists.
    pub history_fallback_window: usize,
    /// Program and leading arguments of the package manager, e.g. `flutter pub`.
    pub pub_command: Vec<String>,
    pub registry_url: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PackageSpec::new(DEFAULT_SOURCE_PACKAGE, DEFAULT_SOURCE_PACKAGE),
            dependent: PackageSpec::new(DEFAULT_DEPENDENT_PACKAGE, DEFAULT_DEPENDENT_PACKAGE),
            changelog_show_date: false,
            history_scan_depth: DEFAULT_SCAN_DEPTH,
            history_fallback_window: DEFAULT_FALLBACK_WINDOW,
            pub_command: vec!["flutter".to_string(), "pub".to_string()],
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from .pubpair/config.toml
    pub fn load(root: &Path) -> Result<Self> {
        let path = config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text)
    }

    /// Parse the TOML text of a config file, falling back to defaults for
    /// every key it omits.
    pub fn parse(text: &str) -> Result<Self> {
        let value: toml::Value = text
            .parse()
            .map_err(|e| PubPairError::Config(format!("invalid config.toml: {e}")))?;
        let defaults = Self::default();

        let source_name = table_str(&value, "packages", "source")
            .unwrap_or(DEFAULT_SOURCE_PACKAGE)
            .to_string();
        let source_dir = table_str(&value, "packages", "source_dir")
            .unwrap_or(&source_name)
            .to_string();
        let dependent_name = table_str(&value, "packages", "dependent")
            .unwrap_or(DEFAULT_DEPENDENT_PACKAGE)
            .to_string();
        let dependent_dir = table_str(&value, "packages", "dependent_dir")
            .unwrap_or(&dependent_name)
            .to_string();

        if source_name.trim().is_empty() || dependent_name.trim().is_empty() {
            return Err(PubPairError::Config(
                "package names must not be empty".to_string(),
            ));
        }
        if source_name == dependent_name {
            return Err(PubPairError::Config(format!(
                "source and dependent packages must differ (both are '{}')",
                source_name
            )));
        }

        let changelog_show_date = value
            .get("changelog")
            .and_then(|v| v.as_table())
            .and_then(|t| t.get("show_date"))
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.changelog_show_date);

        let history_scan_depth = table_count(&value, "history", "scan_depth")?
            .unwrap_or(defaults.history_scan_depth);
        let history_fallback_window = table_count(&value, "history", "fallback_window")?
            .unwrap_or(defaults.history_fallback_window);

        let pub_command = match value
            .get("publish")
            .and_then(|v| v.as_table())
            .and_then(|t| t.get("command"))
        {
            Some(raw) => {
                let parts = raw
                    .as_array()
                    .ok_or_else(|| {
                        PubPairError::Config(
                            "publish.command must be an array of strings".to_string(),
                        )
                    })?
                    .iter()
                    .map(|part| {
                        part.as_str().map(str::to_string).ok_or_else(|| {
                            PubPairError::Config(format!(
                                "publish.command entries must be strings, found: {}",
                                part
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                if parts.is_empty() {
                    return Err(PubPairError::Config(
                        "publish.command must not be empty".to_string(),
                    ));
                }
                parts
            }
            None => defaults.pub_command,
        };

        let registry_url = table_str(&value, "publish", "registry_url")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.registry_url);

        let poll_interval = match table_count(&value, "publish", "poll_interval_secs")? {
            Some(0) => {
                return Err(PubPairError::Config(
                    "publish.poll_interval_secs must be greater than zero".to_string(),
                ));
            }
            Some(secs) => Duration::from_secs(secs as u64),
            None => defaults.poll_interval,
        };
        let poll_timeout = table_count(&value, "publish", "poll_timeout_secs")?
            .map(|secs| Duration::from_secs(secs as u64))
            .unwrap_or(defaults.poll_timeout);

        Ok(Self {
            source: PackageSpec::new(source_name, source_dir),
            dependent: PackageSpec::new(dependent_name, dependent_dir),
            changelog_show_date,
            history_scan_depth,
            history_fallback_window,
            pub_command,
            registry_url,
            poll_interval,
            poll_timeout,
        })
    }

    pub fn layout(&self, root: &Path) -> ProjectLayout {
        ProjectLayout {
            root: root.to_path_buf(),
            source: self.source.clone(),
            dependent: self.dependent.clone(),
        }
    }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Find the repository root by walking up from `start_dir` to the first
/// directory holding either a pubpair config or the source package's pubspec.
pub fn discover_root(start_dir: &Path) -> Result<PathBuf> {
    let defaults = Config::default();
    for dir in start_dir.ancestors() {
        if config_path(dir).exists() {
            return Ok(dir.to_path_buf());
        }
        if defaults.layout(dir).pubspec_path(PackageRole::Source).exists() {
            return Ok(dir.to_path_buf());
        }
    }
    Err(PubPairError::Config(format!(
        "no {}/{} or {}/pubspec.yaml found in {} or any parent directory",
        CONFIG_DIR,
        CONFIG_FILE,
        DEFAULT_SOURCE_PACKAGE,
        start_dir.display()
    )))
}

fn table_str<'a>(value: &'a toml::Value, table: &str, key: &str) -> Option<&'a str> {
    value
        .get(table)
        .and_then(|v| v.as_table())
        .and_then(|t| t.get(key))
        .and_then(|v| v.as_str())
}

fn table_count(value: &toml::Value, table: &str, key: &str) -> Result<Option<usize>> {
    let Some(raw) = value
        .get(table)
        .and_then(|v| v.as_table())
        .and_then(|t| t.get(key))
    else {
        return Ok(None);
    };
    raw.as_integer()
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            PubPairError::Config(format!(
                "{table}.{key} must be a non-negative integer, found: {raw}"
            ))
        })
}
