pub mod cli;
pub mod publish;
pub mod sync;
pub mod ui;

use pubpair_core::config::discover_root;
use pubpair_core::errors::{PubPairError, Result};
use std::path::{Path, PathBuf};

/// The repository root: `--root` when given, otherwise discovered upwards from
/// the current directory.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(root) if root.is_dir() => Ok(root.to_path_buf()),
        Some(root) => Err(PubPairError::Config(format!(
            "--root {} is not a directory",
            root.display()
        ))),
        None => discover_root(&std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_must_be_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(resolve_root(Some(temp.path())).unwrap(), temp.path());

        let missing = temp.path().join("nope");
        let err = resolve_root(Some(&missing)).unwrap_err();
        assert!(matches!(err, PubPairError::Config(_)));
    }
}
