//! Archive reading: extract a named entry to a file.
//!
//! Two formats are recognised by filename suffix: `.zip`, and gzipped tar
//! (`.tar.gz` / `.tgz`). Entry names match case-insensitively in both;
//! zip lookup goes through the central directory while tar is a linear
//! scan, since the format has no index.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

/// Errors raised while extracting an archive entry.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive holds no entry with the requested name.
    #[error("there is no {entry} in {}", archive.display())]
    EntryNotFound { archive: PathBuf, entry: String },

    /// The filename suffix matches no supported format.
    #[error("{} is not a recognised archive", archive.display())]
    UnrecognisedFormat { archive: PathBuf },

    #[error("failed to read archive {}: {source}", archive.display())]
    ReadFailed {
        archive: PathBuf,
        source: io::Error,
    },

    #[error("invalid zip archive {}: {source}", archive.display())]
    Zip {
        archive: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },
}

/// Extract the entry named `entry_name` from `archive` to `target`.
///
/// The format is chosen by the archive's filename suffix; anything other
/// than `.zip`, `.tar.gz`, or `.tgz` is rejected.
pub fn extract_entry(archive: &Path, entry_name: &str, target: &Path) -> Result<(), ArchiveError> {
    let filename = archive
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    debug!(archive = %archive.display(), entry = entry_name, "extracting entry");

    if filename.ends_with(".zip") {
        extract_zip_entry(archive, entry_name, target)
    } else if filename.ends_with(".tar.gz") || filename.ends_with(".tgz") {
        extract_tar_gz_entry(archive, entry_name, target)
    } else {
        Err(ArchiveError::UnrecognisedFormat {
            archive: archive.to_path_buf(),
        })
    }
}

fn extract_zip_entry(archive: &Path, entry_name: &str, target: &Path) -> Result<(), ArchiveError> {
    let file = open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
        archive: archive.to_path_buf(),
        source,
    })?;

    let matched = zip
        .file_names()
        .find(|name| name.eq_ignore_ascii_case(entry_name))
        .map(str::to_owned)
        .ok_or_else(|| ArchiveError::EntryNotFound {
            archive: archive.to_path_buf(),
            entry: entry_name.to_string(),
        })?;

    let mut entry = zip.by_name(&matched).map_err(|source| ArchiveError::Zip {
        archive: archive.to_path_buf(),
        source,
    })?;
    write_entry(&mut entry, target)
}

fn extract_tar_gz_entry(
    archive: &Path,
    entry_name: &str,
    target: &Path,
) -> Result<(), ArchiveError> {
    let read_error = |source: io::Error| ArchiveError::ReadFailed {
        archive: archive.to_path_buf(),
        source,
    };

    let file = open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));

    for entry in tar.entries().map_err(read_error)? {
        let mut entry = entry.map_err(read_error)?;
        let matches = {
            let path = entry.path().map_err(read_error)?;
            path.to_string_lossy().eq_ignore_ascii_case(entry_name)
        };
        if matches {
            return write_entry(&mut entry, target);
        }
    }

    Err(ArchiveError::EntryNotFound {
        archive: archive.to_path_buf(),
        entry: entry_name.to_string(),
    })
}

fn open(archive: &Path) -> Result<BufReader<File>, ArchiveError> {
    File::open(archive)
        .map(BufReader::new)
        .map_err(|source| ArchiveError::ReadFailed {
            archive: archive.to_path_buf(),
            source,
        })
}

fn write_entry<R: io::Read>(entry: &mut R, target: &Path) -> Result<(), ArchiveError> {
    let write_error = |source: io::Error| ArchiveError::WriteFailed {
        path: target.to_path_buf(),
        source,
    };

    let mut output = File::create(target).map_err(write_error)?;
    io::copy(entry, &mut output).map_err(write_error)?;
    Ok(())
}
