//! Error type for the install orchestrator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::fetch::FetchError;
use crate::manifest::ManifestError;

/// Errors that can abort an install run.
///
/// Lower layers never swallow failures; everything surfaces here and the
/// run terminates. Files already written stay in place.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// A requested name matched neither a bare name nor `name-version`.
    #[error("there is no package called {name}")]
    PackageNotFound { name: String },

    /// A manifest or library reference did not resolve to a valid URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// No `lib` directory exists between the working directory and the
    /// filesystem root.
    #[error("couldn't find lib directory")]
    LibDirectoryNotFound,

    #[error("failed to determine current directory: {0}")]
    CurrentDir(io::Error),
}
