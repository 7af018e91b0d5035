//! The install orchestrator.
//!
//! An install run is two scheduler passes over the same machinery:
//!
//! 1. **Registry construction**: fetch the root manifest and everything
//!    it transitively imports, building the package registry.
//! 2. **Install**: resolve every requested name against the registry,
//!    then fetch each package's libraries into
//!    `<lib_dir>/<name>/<version>/`, extracting archive members where a
//!    binary reference carries a `#fragment`.
//!
//! All names resolve before anything is enqueued, so an unknown name
//! fails the run without writing a single library file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::archive;
use crate::fetch::{Destination, DownloadScheduler, FetchError, HttpTransport, Transport};
use crate::package::{PackageRegistry, RegisteredPackage};

mod config;
mod error;
mod registry_builder;
mod reporter;

pub use config::{InstallConfig, ARCHIVE_DIR_NAME, DEFAULT_REPOSITORY_URL};
pub use error::InstallError;
pub use reporter::{InstallReporter, NullReporter};

use reporter::report_fetch_event;

/// Phases of an install run, surfaced to reporters.
///
/// Any unrecovered error is terminal: the run stops where it is, with no
/// rollback of files already written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    BuildingRegistry,
    ResolvingNames,
    Installing,
    Done,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallPhase::BuildingRegistry => "building registry",
            InstallPhase::ResolvingNames => "resolving names",
            InstallPhase::Installing => "installing",
            InstallPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Summary of one installed package.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub libraries: usize,
}

/// Result of a successful install run.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub packages: Vec<InstalledPackage>,
}

/// Top-level driver: builds the registry, resolves names, installs.
pub struct Installer<T: Transport> {
    transport: T,
    config: InstallConfig,
}

impl Installer<HttpTransport> {
    /// Installer using the production HTTP transport.
    pub fn new(config: InstallConfig) -> Self {
        Self::with_transport(HttpTransport::new(), config)
    }
}

impl<T: Transport> Installer<T> {
    /// Installer over an explicit transport, for tests and embedding.
    pub fn with_transport(transport: T, config: InstallConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Run the registry-construction pass on its own.
    ///
    /// Creates the archive cache directory, then absorbs the root manifest
    /// and all of its transitive imports. The returned registry is
    /// complete and stable.
    pub fn build_registry(
        &self,
        reporter: &dyn InstallReporter,
    ) -> Result<PackageRegistry, InstallError> {
        let archive_dir = self.config.archive_dir();
        fs::create_dir_all(&archive_dir).map_err(|source| InstallError::CreateDirFailed {
            path: archive_dir.clone(),
            source,
        })?;

        registry_builder::build(
            &self.transport,
            &self.config.repository_url,
            &archive_dir,
            reporter,
        )
    }

    /// Install the named packages (`name` or `name-version` forms).
    pub fn install(
        &self,
        names: &[String],
        reporter: &dyn InstallReporter,
    ) -> Result<InstallReport, InstallError> {
        reporter.on_phase(InstallPhase::BuildingRegistry);
        let registry = self.build_registry(reporter)?;
        info!(packages = registry.len(), "registry complete");

        // Resolve everything up front so a bad name fails before any
        // library download is enqueued.
        reporter.on_phase(InstallPhase::ResolvingNames);
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let entry = registry
                .lookup(name)
                .ok_or_else(|| InstallError::PackageNotFound { name: name.clone() })?;
            resolved.push(entry);
        }

        reporter.on_phase(InstallPhase::Installing);
        let mut scheduler = DownloadScheduler::<_, InstallError>::new(&self.transport);
        scheduler.set_event_handler(Box::new(move |event| report_fetch_event(reporter, event)));

        let mut report = InstallReport::default();
        for entry in resolved {
            report
                .packages
                .push(self.enqueue_package(&mut scheduler, entry, reporter)?);
        }
        run_steps(&mut scheduler, reporter)?;
        drop(scheduler);

        reporter.on_phase(InstallPhase::Done);
        Ok(report)
    }

    /// Enqueue every library of one package onto the install pass.
    fn enqueue_package<'a>(
        &'a self,
        scheduler: &mut DownloadScheduler<'a, T, InstallError>,
        entry: &RegisteredPackage,
        reporter: &'a dyn InstallReporter,
    ) -> Result<InstalledPackage, InstallError> {
        let package = &entry.package;

        let site_url = match package.master_sites.first() {
            Some(site) => resolve_url(&entry.manifest_url, site)?,
            None => entry.manifest_url.clone(),
        };

        let package_dir = self.config.lib_dir.join(&package.name).join(&package.version);
        fs::create_dir_all(&package_dir).map_err(|source| InstallError::CreateDirFailed {
            path: package_dir.clone(),
            source,
        })?;
        debug!(package = %package.name, dir = %package_dir.display(), "installing package");

        for (filename, library) in &package.libraries {
            let download_url = resolve_url(&site_url, &library.binary)?;
            let target = package_dir.join(filename);

            match download_url.fragment().filter(|f| !f.is_empty()) {
                None => {
                    let success_url = download_url.clone();
                    scheduler.enqueue(
                        download_url,
                        Destination::File(target),
                        Box::new(move |_queue, path| {
                            reporter.on_installed(&success_url, path);
                            Ok(())
                        }),
                    );
                }
                Some(fragment) => {
                    let entry_name = fragment.to_string();
                    let mut archive_url = download_url.clone();
                    archive_url.set_fragment(None);

                    scheduler.enqueue(
                        archive_url,
                        Destination::Directory(self.config.archive_dir()),
                        Box::new(move |_queue, archive_path| {
                            unpack_archive(archive_path, &entry_name, &target, &download_url, reporter)
                        }),
                    );
                }
            }
        }

        Ok(InstalledPackage {
            name: package.name.clone(),
            version: package.version.clone(),
            path: package_dir,
            libraries: package.libraries.len(),
        })
    }
}

/// Extract one archive member to its final target, unless the target is
/// already at least as new as the archive.
fn unpack_archive(
    archive_path: &Path,
    entry_name: &str,
    target: &Path,
    url: &Url,
    reporter: &dyn InstallReporter,
) -> Result<(), InstallError> {
    let archive_mtime = fs::metadata(archive_path).and_then(|m| m.modified()).ok();
    let target_mtime = fs::metadata(target).and_then(|m| m.modified()).ok();

    let stale = match (target_mtime, archive_mtime) {
        (None, _) => true,
        (Some(target_time), Some(archive_time)) => archive_time > target_time,
        (Some(_), None) => false,
    };
    if stale {
        reporter.on_message(&format!(
            "Unpacking {} to {}",
            archive_path.display(),
            target.display()
        ));
        archive::extract_entry(archive_path, entry_name, target)?;
        reporter.on_installed(url, target);
    }

    Ok(())
}

/// Drive a scheduler pass to its fixed point, announcing each numbered
/// step through the reporter.
fn run_steps<T, E>(
    scheduler: &mut DownloadScheduler<'_, T, E>,
    reporter: &dyn InstallReporter,
) -> Result<(), E>
where
    T: Transport,
    E: From<FetchError>,
{
    let mut number = 1;
    loop {
        reporter.on_step(number);
        if !scheduler.step()? {
            return Ok(());
        }
        number += 1;
    }
}

fn resolve_url(base: &Url, reference: &str) -> Result<Url, InstallError> {
    base.join(reference)
        .map_err(|source| InstallError::InvalidUrl {
            url: reference.to_string(),
            source,
        })
}

/// Locate the `lib` directory by walking upward from the current
/// directory, the way the tool has always found its install root.
pub fn find_lib_directory() -> Result<PathBuf, InstallError> {
    let current = std::env::current_dir().map_err(InstallError::CurrentDir)?;
    find_lib_directory_from(&current).ok_or(InstallError::LibDirectoryNotFound)
}

fn find_lib_directory_from(start: &Path) -> Option<PathBuf> {
    let mut directory = start.to_path_buf();
    loop {
        let candidate = directory.join("lib");
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !directory.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_install_phase_display() {
        assert_eq!(InstallPhase::BuildingRegistry.to_string(), "building registry");
        assert_eq!(InstallPhase::Installing.to_string(), "installing");
    }

    #[test]
    fn test_find_lib_directory_from_walks_upward() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        let nested = temp.path().join("src/deep/inner");
        fs::create_dir_all(&lib).unwrap();
        fs::create_dir_all(&nested).unwrap();

        let found = find_lib_directory_from(&nested).unwrap();
        assert_eq!(fs::canonicalize(found).unwrap(), fs::canonicalize(&lib).unwrap());
    }

    #[test]
    fn test_find_lib_directory_from_prefers_nearest() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("lib");
        let project = temp.path().join("project");
        let inner = project.join("lib");
        fs::create_dir_all(&outer).unwrap();
        fs::create_dir_all(&inner).unwrap();

        let found = find_lib_directory_from(&project).unwrap();
        assert_eq!(
            fs::canonicalize(found).unwrap(),
            fs::canonicalize(&inner).unwrap()
        );
    }

    #[test]
    fn test_find_lib_directory_from_empty_tree_looks_past_it() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        // A `lib` further up the real filesystem is fair game; nothing
        // inside the empty temp tree qualifies.
        if let Some(found) = find_lib_directory_from(&nested) {
            assert!(!found.starts_with(temp.path()));
        }
    }
}
