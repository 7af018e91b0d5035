//! NPack - package fetching and installation for library directory trees.
//!
//! Given one or more package names and a repository manifest URL, npack
//! resolves package definitions (following manifest imports recursively),
//! downloads the binaries they reference - directly, or as named members of
//! shared archives - and materializes them under `lib/<name>/<version>/`.
//!
//! The machinery is layered, leaves first:
//!
//! - [`package`]: the manifest data model and the package registry
//! - [`manifest`]: JSON and legacy line-format deserialization
//! - [`fetch`]: the download scheduler and the transport boundary
//! - [`archive`]: extract-entry-by-name for zip and tar.gz archives
//! - [`install`]: the two-pass orchestrator driving all of the above

pub mod archive;
pub mod fetch;
pub mod install;
pub mod manifest;
pub mod package;

pub use install::{
    find_lib_directory, InstallConfig, InstallError, InstallPhase, InstallReport, InstallReporter,
    Installer, NullReporter, DEFAULT_REPOSITORY_URL,
};
pub use package::{Library, Package, PackageRegistry, Repository};

// Re-exported so frontends can parse repository URLs without naming the
// url crate themselves.
pub use url::Url;
