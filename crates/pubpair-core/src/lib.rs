pub mod adapters;
pub mod changelog;
pub mod classify;
pub mod config;
pub mod errors;
pub mod git;
pub mod manifest;
pub mod markdown;
pub mod process;
pub mod publish;
pub mod sync;
pub mod types;

/// User agent sent with registry requests.
pub const USER_AGENT: &str = concat!("pubpair-core/", env!("CARGO_PKG_VERSION"));

// Re-export commonly used items
pub use adapters::{DryRunVerdict, PubCli, PubDevRegistry, PubTool, Registry, classify_dry_run};
pub use changelog::{ChangelogUpdate, generate_changelogs, update_changelog};
pub use classify::{
    Classification, classify_commit, classify_commits, deduplicate, format_commit_message,
};
pub use config::{Config, discover_root};
pub use errors::{PubPairError, Result};
pub use manifest::Pubspec;
pub use publish::{
    PollSettings, Prompter, PublishContext, PublishOptions, PublishOutcome, run_publish,
    wait_for_registry,
};
pub use sync::{
    SyncReport, SyncStatus, Versions, check_sync, get_versions, is_valid_version, print_status,
    sync_to,
};
pub use types::{Affected, CommitRecord, PackageRole, PackageSpec, ProjectLayout};
