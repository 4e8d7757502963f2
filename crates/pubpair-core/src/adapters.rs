//! Adapters over the external tools a release talks to: the `pub` CLI and the
//! package registry.
pub mod pub_cli;
pub mod pub_dev;

pub use pub_cli::{DryRunVerdict, PubCli, classify_dry_run};
pub use pub_dev::PubDevRegistry;

use crate::errors::Result;
use crate::process::CapturedOutput;
use std::path::Path;

/// Runs the package manager's `pub` subcommands inside a package directory.
pub trait PubTool {
    /// `publish --dry-run`, output captured for classification.
    fn dry_run(&self, package_dir: &Path) -> Result<CapturedOutput>;

    /// `publish [--force]` with inherited stdio. Returns whether it succeeded.
    fn publish(&self, package_dir: &Path, force: bool) -> Result<bool>;

    /// `get`, output captured so a failure can be shown to the user.
    fn get(&self, package_dir: &Path) -> Result<CapturedOutput>;
}

/// Read access to a package registry.
pub trait Registry {
    /// Every version of `package` the registry currently lists.
    fn published_versions(&self, package: &str) -> Result<Vec<String>>;

    /// Check if a specific version is already visible on the registry.
    fn version_exists(&self, package: &str, version: &str) -> Result<bool> {
        Ok(self
            .published_versions(package)?
            .iter()
            .any(|published| published == version))
    }
}
