//! Registry construction: one scheduler pass over the manifest graph.
//!
//! The root manifest is enqueued with a register-repository continuation;
//! each absorbed manifest registers its packages and enqueues its imports
//! for the next step. Because continuation enqueues only become visible a
//! step later, the import graph is absorbed breadth-first, and the pass
//! ends when a step produces no new work.
//!
//! Import URLs are tracked in a visited set, so a manifest importing
//! itself (or an import cycle) is absorbed once and then ignored instead
//! of looping.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;

use tracing::debug;
use url::Url;

use crate::fetch::{Continuation, Destination, DownloadScheduler, Queue, Transport};
use crate::manifest;
use crate::package::{PackageRegistry, Repository};

use super::error::InstallError;
use super::reporter::{report_fetch_event, InstallReporter};
use super::{resolve_url, run_steps};

/// Mutable state shared by the pass's continuations. Frozen (moved out as
/// a plain registry) once the step loop terminates.
struct BuilderState {
    registry: PackageRegistry,
    visited: HashSet<Url>,
}

/// Drive a scheduler pass that absorbs `root_url` and everything it
/// transitively imports, producing the completed registry.
pub(crate) fn build<T: Transport>(
    transport: &T,
    root_url: &Url,
    archive_dir: &Path,
    reporter: &dyn InstallReporter,
) -> Result<PackageRegistry, InstallError> {
    let state = RefCell::new(BuilderState {
        registry: PackageRegistry::new(),
        visited: HashSet::from([root_url.clone()]),
    });

    let mut scheduler = DownloadScheduler::<_, InstallError>::new(transport);
    scheduler.set_event_handler(Box::new(move |event| report_fetch_event(reporter, event)));
    scheduler.enqueue(
        root_url.clone(),
        Destination::Directory(archive_dir.to_path_buf()),
        register_repository(&state, archive_dir, root_url.clone()),
    );
    run_steps(&mut scheduler, reporter)?;
    drop(scheduler);

    Ok(state.into_inner().registry)
}

/// Continuation that parses a fetched repository manifest and absorbs it.
fn register_repository<'a>(
    state: &'a RefCell<BuilderState>,
    archive_dir: &'a Path,
    manifest_url: Url,
) -> Continuation<'a, InstallError> {
    Box::new(move |queue, path| {
        let repository = manifest::read_repository(path)?;
        absorb_repository(state, archive_dir, &manifest_url, repository, queue)
    })
}

/// Continuation that parses a fetched single-package manifest.
fn register_package<'a>(
    state: &'a RefCell<BuilderState>,
    manifest_url: Url,
) -> Continuation<'a, InstallError> {
    Box::new(move |_queue, path| {
        let package = manifest::read_package(path)?;
        debug!(name = %package.name, version = %package.version, "registering package");
        state.borrow_mut().registry.register(package, manifest_url);
        Ok(())
    })
}

fn absorb_repository<'a>(
    state: &'a RefCell<BuilderState>,
    archive_dir: &'a Path,
    manifest_url: &Url,
    repository: Repository,
    queue: &mut Queue<'a, InstallError>,
) -> Result<(), InstallError> {
    let mut guard = state.borrow_mut();

    for package in repository.packages {
        debug!(name = %package.name, version = %package.version, "registering package");
        guard.registry.register(package, manifest_url.clone());
    }

    for import in &repository.repository_imports {
        let url = resolve_url(manifest_url, import)?;
        if guard.visited.insert(url.clone()) {
            queue.enqueue(
                url.clone(),
                Destination::Directory(archive_dir.to_path_buf()),
                register_repository(state, archive_dir, url),
            );
        }
    }

    for import in &repository.package_imports {
        let url = resolve_url(manifest_url, import)?;
        if guard.visited.insert(url.clone()) {
            queue.enqueue(
                url.clone(),
                Destination::Directory(archive_dir.to_path_buf()),
                register_package(state, url),
            );
        }
    }

    Ok(())
}
