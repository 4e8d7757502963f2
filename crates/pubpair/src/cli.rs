use clap::Parser;
use std::path::PathBuf;

/// Keep both packages at the same version and generate their changelogs from git history
#[derive(Debug, Parser)]
#[command(
    name = "sync-version",
    version,
    about,
    long_about = None,
    after_long_help = "\
Examples:\n  sync-version            show current versions\n  sync-version --check    exit 1 if the packages are out of sync\n  sync-version 0.4.0      bump both packages and update their changelogs"
)]
pub struct SyncVersionCli {
    /// New version (X.Y.Z) for both packages; omit to print the current status
    #[arg(id = "new_version", value_name = "VERSION", conflicts_with = "check")]
    pub version: Option<String>,

    /// Verify that versions and the dependency constraint are in sync
    #[arg(long)]
    pub check: bool,

    /// Repository root (discovered from the current directory if omitted)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Publish the source package, wait for the registry, then publish the dependent package
#[derive(Debug, Parser, Default)]
#[command(name = "publish", version, about, long_about = None)]
pub struct PublishCli {
    /// Dry-run: validate both packages without publishing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip validation and confirmations, and publish with `--force`
    #[arg(long)]
    pub force: bool,

    /// Repository root (discovered from the current directory if omitted)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}
