//! Configuration for the install orchestrator.

use std::path::PathBuf;

use url::Url;

/// Well-known repository manifest consulted when none is given.
pub const DEFAULT_REPOSITORY_URL: &str = "http://np.partario.com/packages.js";

/// Name of the shared archive cache directory under the lib directory.
pub const ARCHIVE_DIR_NAME: &str = ".dist";

/// Configuration for an install run.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Root of the library tree; packages land at
    /// `<lib_dir>/<name>/<version>/`.
    pub lib_dir: PathBuf,

    /// Location of the root repository manifest.
    pub repository_url: Url,
}

impl InstallConfig {
    pub fn new(lib_dir: impl Into<PathBuf>, repository_url: Url) -> Self {
        Self {
            lib_dir: lib_dir.into(),
            repository_url,
        }
    }

    /// Configuration pointing at the well-known default repository.
    pub fn with_default_repository(lib_dir: impl Into<PathBuf>) -> Self {
        let repository_url =
            Url::parse(DEFAULT_REPOSITORY_URL).expect("default repository URL is valid");
        Self::new(lib_dir, repository_url)
    }

    /// The shared archive cache, holding downloaded manifests and archives
    /// keyed by server-derived filename.
    pub fn archive_dir(&self) -> PathBuf {
        self.lib_dir.join(ARCHIVE_DIR_NAME)
    }
}
