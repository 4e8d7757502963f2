use crate::cli::PublishCli;
use crate::resolve_root;
use crate::ui::{self, TerminalPrompter};
use pubpair_core::adapters::{PubCli, PubDevRegistry};
use pubpair_core::config::Config;
use pubpair_core::errors::Result;
use pubpair_core::publish::{
    PollSettings, PublishContext, PublishOptions, PublishOutcome, run_publish,
};

/// Run `publish` against the real `pub` CLI and registry.
pub fn run(args: &PublishCli) -> Result<PublishOutcome> {
    let root = resolve_root(args.root.as_deref())?;
    tracing::debug!(root = %root.display(), "resolved repository root");
    let config = Config::load(&root)?;
    let layout = config.layout(&root);

    let tool = PubCli::from_config(&config)?;
    let registry = PubDevRegistry::from_config(&config)?;
    let ctx = PublishContext {
        tool: &tool,
        registry: &registry,
        prompter: &TerminalPrompter,
        poll: PollSettings::from_config(&config),
    };
    let options = PublishOptions {
        dry_run: args.dry_run,
        force: args.force,
    };

    let outcome = run_publish(&layout, options, &ctx)?;
    match &outcome {
        PublishOutcome::Published { version } => ui::log_success_value(
            "Published",
            &format!(
                "{} {version}, {} {version}",
                layout.source.name, layout.dependent.name
            ),
        ),
        PublishOutcome::Cancelled => ui::log_warning("Nothing was published."),
        PublishOutcome::DryRunPassed { .. } => {}
    }
    Ok(outcome)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_project(root: &Path, dependent_version: &str, script: &str) {
        fs::create_dir_all(root.join(".pubpair")).unwrap();
        fs::write(
            root.join(".pubpair/config.toml"),
            format!(
                "[publish]\ncommand = [\"sh\", \"-c\", \"{script}\"]\nregistry_url = \"http://127.0.0.1:9/api\"\n"
            ),
        )
        .unwrap();
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

    fn dry_run_args(root: &Path) -> PublishCli {
        PublishCli {
            dry_run: true,
            force: false,
            root: Some(root.to_path_buf()),
        }
    }

    #[test]
    fn dry_run_passes_without_publishing() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        // Record every invocation so a real publish would be visible.
        write_project(
            root,
            "0.3.0",
            "echo \\\"$0 $1\\\" >> ../calls.log; echo 'Validating package...'",
        );

        let outcome = run(&dry_run_args(root)).unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::DryRunPassed {
                version: "0.3.0".into()
            }
        );
        let calls = fs::read_to_string(root.join("calls.log")).unwrap();
        assert_eq!(calls, "publish --dry-run\npublish --dry-run\n");
    }

    #[test]
    fn dry_run_failure_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path(), "0.3.0", "echo 'no pubspec' >&2; exit 66");
        assert!(run(&dry_run_args(temp.path())).is_err());
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        write_project(temp.path(), "0.2.0", "echo 'Validating package...'");
        assert!(run(&dry_run_args(temp.path())).is_err());
    }
}
