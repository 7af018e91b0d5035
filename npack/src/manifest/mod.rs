//! Manifest deserialization.
//!
//! Two manifest notations feed the same in-memory model:
//!
//! - JSON repository documents (`packages.js`): a `Repository` with
//!   packages and import links.
//! - The legacy line-oriented `.np` notation: one package per document,
//!   `Key: value` pairs with indentation nesting (see [`np`]).
//!
//! Dispatch is by filename suffix: `.np` selects the line format,
//! everything else is parsed as JSON.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::package::{Package, Repository};

mod np;

/// Errors raised while reading or parsing a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("failed to parse manifest {}: {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Parse the manifest at `path` into a repository.
///
/// A `.np` file holds a single package and no imports; it is wrapped as a
/// one-package repository so both notations flow through the same
/// registration path.
pub fn read_repository(path: &Path) -> Result<Repository, ManifestError> {
    if is_np(path) {
        read_np(path).map(Repository::from_package)
    } else {
        let reader = open(path)?;
        serde_json::from_reader(reader).map_err(|source| ManifestError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parse the manifest at `path` into a single package definition.
pub fn read_package(path: &Path) -> Result<Package, ManifestError> {
    if is_np(path) {
        read_np(path)
    } else {
        let reader = open(path)?;
        serde_json::from_reader(reader).map_err(|source| ManifestError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_np(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension.eq_ignore_ascii_case("np"))
        .unwrap_or(false)
}

fn open(path: &Path) -> Result<BufReader<File>, ManifestError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ManifestError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

fn read_np(path: &Path) -> Result<Package, ManifestError> {
    let reader = open(path)?;
    np::parse_package(reader).map_err(|source| ManifestError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}
