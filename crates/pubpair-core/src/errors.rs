use std::io;
use std::path::Path;

/// Canonical result type for pubpair code
pub type Result<T> = std::result::Result<T, PubPairError>;

/// Common error type for pubpair operations
#[derive(Debug, thiserror::Error)]
pub enum PubPairError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Invalid version format '{0}'. Expected: X.Y.Z")]
    InvalidVersion(String),

    #[error("Versions are out of sync: {0}")]
    OutOfSync(String),

    #[error("Dry-run failed: {0}")]
    DryRun(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),
}

/// Helper to create an IO error with file path context
pub fn io_error_with_path<P: AsRef<Path>>(error: io::Error, path: P) -> io::Error {
    io::Error::new(
        error.kind(),
        format!("{}: {}", path.as_ref().display(), error),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = io_error_with_path(
            io::Error::new(io::ErrorKind::NotFound, "missing"),
            "pkg/pubspec.yaml",
        );
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("pkg/pubspec.yaml"));
    }

    #[test]
    fn invalid_version_message_names_expected_format() {
        let err = PubPairError::InvalidVersion("1.2".into());
        assert_eq!(
            err.to_string(),
            "Invalid version format '1.2'. Expected: X.Y.Z"
        );
    }
}
