use crate::cli::SyncVersionCli;
use crate::resolve_root;
use crate::ui;
use pubpair_core::config::Config;
use pubpair_core::errors::{PubPairError, Result};
use pubpair_core::sync::{check_sync, is_valid_version, print_status, sync_to};

/// Run `sync-version`. Returns `false` when `--check` finds the packages out of sync.
pub fn run(args: &SyncVersionCli) -> Result<bool> {
    if let Some(version) = &args.version
        && !is_valid_version(version)
    {
        return Err(PubPairError::InvalidVersion(version.clone()));
    }

    let root = resolve_root(args.root.as_deref())?;
    tracing::debug!(root = %root.display(), "resolved repository root");
    let config = Config::load(&root)?;
    let layout = config.layout(&root);

    match &args.version {
        Some(version) => {
            let report = sync_to(&layout, &config, version)?;
            ui::log_success_value(
                "Synced",
                &format!("{} -> {}", report.previous.source, report.new_version),
            );
            Ok(true)
        }
        None if args.check => check_sync(&layout),
        None => {
            print_status(&layout)?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_pair(root: &Path, dependent_version: &str) {
        for (dir, text) in [
            (
                "dart_object_extension",
                "name: dart_object_extension\nversion: 0.3.0\n".to_string(),
            ),
            (
                "dart_object_extension_gen",
                format!(
                    "name: dart_object_extension_gen\nversion: {dependent_version}\ndependencies:\n  dart_object_extension: ^0.3.0\n"
                ),
            ),
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
            fs::write(root.join(dir).join("pubspec.yaml"), text).unwrap();
        }
    }

    fn args(root: &Path, version: Option<&str>, check: bool) -> SyncVersionCli {
        SyncVersionCli {
            version: version.map(str::to_string),
            check,
            root: Some(root.to_path_buf()),
        }
    }

    #[test]
    fn check_reports_sync_state() {
        let temp = tempfile::tempdir().unwrap();
        write_pair(temp.path(), "0.3.0");
        assert!(run(&args(temp.path(), None, true)).unwrap());

        write_pair(temp.path(), "0.2.0");
        assert!(!run(&args(temp.path(), None, true)).unwrap());
    }

    #[test]
    fn status_always_succeeds() {
        let temp = tempfile::tempdir().unwrap();
        write_pair(temp.path(), "0.2.0");
        assert!(run(&args(temp.path(), None, false)).unwrap());
    }

    #[test]
    fn invalid_version_fails_before_touching_files() {
        let temp = tempfile::tempdir().unwrap();
        write_pair(temp.path(), "0.3.0");
        let err = run(&args(temp.path(), Some("1.2.x"), false)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid version format '1.2.x'. Expected: X.Y.Z"
        );
        let source =
            fs::read_to_string(temp.path().join("dart_object_extension/pubspec.yaml")).unwrap();
        assert!(source.contains("version: 0.3.0"));
    }

    #[test]
    fn config_selects_other_packages() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".pubpair")).unwrap();
        fs::write(
            root.join(".pubpair/config.toml"),
            "[packages]\nsource = \"core\"\nsource_dir = \"packages/core\"\ndependent = \"core_gen\"\ndependent_dir = \"packages/core_gen\"\n",
        )
        .unwrap();
        for (dir, text) in [
            ("packages/core", "name: core\nversion: 1.0.0\n"),
            (
                "packages/core_gen",
                "name: core_gen\nversion: 1.0.0\ndependencies:\n  core: ^1.0.0\n",
            ),
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
            fs::write(root.join(dir).join("pubspec.yaml"), text).unwrap();
        }
        assert!(run(&args(root, None, true)).unwrap());
    }
}
