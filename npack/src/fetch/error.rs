//! Error types for resource fetching.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the transport or the download scheduler.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport could not produce a response for a URL.
    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// A directory-sentinel destination needed a filename, but neither the
    /// response headers nor the response URL supplied one.
    #[error("cannot determine a filename for {url}")]
    NoFilename { url: String },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_display() {
        let error = FetchError::FetchFailed {
            url: "http://example.com/x.dll".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to fetch http://example.com/x.dll: connection refused"
        );
    }

    #[test]
    fn test_no_filename_display() {
        let error = FetchError::NoFilename {
            url: "http://example.com/".to_string(),
        };
        assert!(error.to_string().contains("cannot determine a filename"));
    }
}
