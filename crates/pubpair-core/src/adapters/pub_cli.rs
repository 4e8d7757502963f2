use super::PubTool;
use crate::config::Config;
use crate::errors::{PubPairError, Result};
use crate::process::{CapturedOutput, command, run_captured, run_inherited};
use std::path::Path;
use std::process::Command;

const VALIDATION_ERROR_MARKER: &str = "Package validation found the following error";
const VALIDATION_MARKER: &str = "Validating package";
const WARNING_SUMMARY_MARKER: &str = "Package has";

/// The `pub` CLI of a Flutter or Dart SDK, e.g. `flutter pub` or `dart pub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubCli {
    program: String,
    leading_args: Vec<String>,
}

impl PubCli {
    /// Build from a program followed by its leading arguments.
    pub fn new(command_line: &[String]) -> Result<Self> {
        let (program, leading_args) = command_line.split_first().ok_or_else(|| {
            PubPairError::Config("publish command must name a program".to_string())
        })?;
        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.pub_command)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = command(&self.program);
        cmd.args(&self.leading_args);
        cmd.args(args);
        cmd
    }
}

impl PubTool for PubCli {
    fn dry_run(&self, package_dir: &Path) -> Result<CapturedOutput> {
        run_captured(self.command(&["publish", "--dry-run"]), package_dir)
    }

    fn publish(&self, package_dir: &Path, force: bool) -> Result<bool> {
        let mut args = vec!["publish"];
        if force {
            args.push("--force");
        }
        run_inherited(self.command(&args), package_dir)
    }

    fn get(&self, package_dir: &Path) -> Result<CapturedOutput> {
        run_captured(self.command(&["get"]), package_dir)
    }
}

/// Outcome of a `publish --dry-run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRunVerdict {
    Passed,
    /// Validation ran and reported warnings; carries the lines worth showing.
    PassedWithWarnings(Vec<String>),
    Failed,
}

/// Classify the captured output of `publish --dry-run`.
///
/// The validator's own report takes precedence over the exit code: a run that
/// printed `Validating package` passes even when the tool exits non-zero
/// because of warnings.
pub fn classify_dry_run(output: &CapturedOutput) -> DryRunVerdict {
    let combined = output.combined();

    if combined.contains(VALIDATION_ERROR_MARKER) {
        return DryRunVerdict::Failed;
    }

    let validation_ran = combined.contains(VALIDATION_MARKER);
    let has_warning = combined.contains(WARNING_SUMMARY_MARKER) && combined.contains("warning");

    if validation_ran && has_warning {
        return DryRunVerdict::PassedWithWarnings(warning_lines(&combined));
    }
    if validation_ran {
        return DryRunVerdict::Passed;
    }
    if !output.success() {
        return DryRunVerdict::Failed;
    }
    DryRunVerdict::Passed
}

fn warning_lines(combined: &str) -> Vec<String> {
    combined
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("warning") || lower.contains("modified") || line.contains('*')
        })
        .map(|line| line.trim().to_string())
        .collect()
}
