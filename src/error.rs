//! Error taxonomy for the indexing core
//!
//! Scan-level errors abort a rebuild and are reported to the caller.
//! File-level problems (unreadable, undecodable, oversized) are recovered
//! locally: the file is skipped and counted, never failing the scan.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the indexing and query contracts
#[derive(Debug, Error)]
pub enum ScanError {
    /// The requested root path does not exist
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The requested root path exists but is not a directory
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A rebuild is already in flight on this coordinator
    #[error("a rebuild is already in progress")]
    RebuildInProgress,

    /// No snapshot has been published yet; run a rebuild first
    #[error("no index available; run a rebuild first")]
    NotIndexed,
}

impl ScanError {
    /// Stable machine-readable kind string for programmatic consumers
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::PathNotFound(_) => "PathNotFound",
            ScanError::NotADirectory(_) => "NotADirectory",
            ScanError::RebuildInProgress => "RebuildInProgress",
            ScanError::NotIndexed => "NotIndexed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(ScanError::PathNotFound("/x".into()).kind(), "PathNotFound");
        assert_eq!(ScanError::NotADirectory("/x".into()).kind(), "NotADirectory");
        assert_eq!(ScanError::RebuildInProgress.kind(), "RebuildInProgress");
        assert_eq!(ScanError::NotIndexed.kind(), "NotIndexed");
    }

    #[test]
    fn test_error_messages_mention_path() {
        let err = ScanError::PathNotFound(PathBuf::from("/tmp/missing"));
        assert!(err.to_string().contains("/tmp/missing"));
    }
}
