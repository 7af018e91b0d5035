//! The download scheduler: a stepwise worklist over download actions.
//!
//! Actions are `(url, destination, continuation)` triples. [`DownloadScheduler::step`]
//! executes exactly the batch present when it is called:
//!
//! - actions are ordered deterministically (URL, then destination, both
//!   case-insensitively), so log output and timestamp outcomes are
//!   reproducible;
//! - each distinct URL is fetched through the transport at most once per
//!   step; every further destination for that URL is satisfied by a local
//!   copy of the first one;
//! - a destination whose file is already at least as new as the remote
//!   resource is left untouched, body unread;
//! - continuations run synchronously and may enqueue follow-up actions,
//!   which become visible in the *next* step, never the current one.
//!
//! Callers drive `step` until it returns `false`; that fixed point is one
//! pass.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use tracing::debug;
use url::Url;

use super::error::FetchError;
use super::transport::Transport;

/// Where a fetched resource lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Write the resource to exactly this path.
    File(PathBuf),

    /// Place the resource in this directory under its server-derived name
    /// (the directory sentinel).
    Directory(PathBuf),
}

impl Destination {
    /// Case-insensitive grouping key. A directory sentinel is kept distinct
    /// from a file of the same name by its trailing separator.
    fn group_key(&self) -> String {
        match self {
            Destination::File(path) => path.to_string_lossy().to_lowercase(),
            Destination::Directory(path) => format!(
                "{}{}",
                path.to_string_lossy().to_lowercase(),
                std::path::MAIN_SEPARATOR
            ),
        }
    }

    fn resolve(&self, server_filename: Option<&str>, url: &Url) -> Result<PathBuf, FetchError> {
        match self {
            Destination::File(path) => Ok(path.clone()),
            Destination::Directory(directory) => {
                let name = server_filename
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| FetchError::NoFilename {
                        url: url.to_string(),
                    })?;
                Ok(directory.join(name))
            }
        }
    }
}

/// Observable scheduler activity.
///
/// A side channel for logging and progress display; control flow never
/// depends on whether anyone listens.
#[derive(Debug)]
pub enum FetchEvent<'e> {
    Checking { url: &'e Url },
    Downloading { from: &'e Url, to: &'e Path },
    Copying { from: &'e Path, to: &'e Path },
}

/// Callback invoked for every [`FetchEvent`].
pub type EventHandler<'a> = Box<dyn Fn(FetchEvent<'_>) + 'a>;

/// Handler run once the action's resource is on disk. Receives the queue
/// so it can enqueue follow-up actions for the next step.
pub type Continuation<'a, E> = Box<dyn FnOnce(&mut Queue<'a, E>, &Path) -> Result<(), E> + 'a>;

struct Action<'a, E> {
    url: Url,
    destination: Destination,
    continuation: Continuation<'a, E>,
}

/// The scheduler's pending-action list.
pub struct Queue<'a, E> {
    actions: Vec<Action<'a, E>>,
}

impl<'a, E> Queue<'a, E> {
    /// Append an action; nothing executes until the next step.
    pub fn enqueue(
        &mut self,
        url: Url,
        destination: Destination,
        continuation: Continuation<'a, E>,
    ) {
        self.actions.push(Action {
            url,
            destination,
            continuation,
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Outcome of the single transport fetch for a URL group, reused by every
/// later destination sub-group of the same URL.
struct FirstFetch {
    path: PathBuf,
    mtime: Option<SystemTime>,
    server_filename: Option<String>,
}

/// Worklist engine executing download actions in discrete steps.
///
/// Generic over the continuation error type so richer error enums from the
/// layers above can flow out of [`step`](Self::step) unchanged.
pub struct DownloadScheduler<'a, T, E = FetchError> {
    transport: &'a T,
    queue: Queue<'a, E>,
    on_event: Option<EventHandler<'a>>,
}

impl<'a, T, E> DownloadScheduler<'a, T, E>
where
    T: Transport,
    E: From<FetchError>,
{
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            queue: Queue {
                actions: Vec::new(),
            },
            on_event: None,
        }
    }

    /// Install a handler for checking/downloading/copying events.
    pub fn set_event_handler(&mut self, handler: EventHandler<'a>) {
        self.on_event = Some(handler);
    }

    /// Append an action. Never blocks, never executes immediately.
    pub fn enqueue(
        &mut self,
        url: Url,
        destination: Destination,
        continuation: Continuation<'a, E>,
    ) {
        self.queue.enqueue(url, destination, continuation);
    }

    /// Number of actions waiting for the next step.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Execute the batch of actions enqueued so far.
    ///
    /// Returns whether continuations enqueued new work, i.e. whether
    /// another step is required. Errors abort the step immediately and
    /// leave any work already enqueued for the next step in place.
    pub fn step(&mut self) -> Result<bool, E> {
        let mut batch = std::mem::take(&mut self.queue.actions);
        batch.sort_by_cached_key(|action| {
            (
                action.url.as_str().to_lowercase(),
                action.url.as_str().to_string(),
                action.destination.group_key(),
            )
        });

        let mut groups: Vec<Vec<Action<'a, E>>> = Vec::new();
        for action in batch {
            match groups.last_mut() {
                Some(group) if group[0].url == action.url => group.push(action),
                _ => groups.push(vec![action]),
            }
        }

        for group in groups {
            self.process_url_group(group)?;
        }

        Ok(!self.queue.is_empty())
    }

    /// Handle every action sharing one source URL: one fetch for the first
    /// destination sub-group, local copies for the rest.
    fn process_url_group(&mut self, group: Vec<Action<'a, E>>) -> Result<(), E> {
        let url = group[0].url.clone();

        let mut subgroups: Vec<Vec<Action<'a, E>>> = Vec::new();
        for action in group {
            match subgroups.last_mut() {
                Some(sub) if sub[0].destination.group_key() == action.destination.group_key() => {
                    sub.push(action)
                }
                _ => subgroups.push(vec![action]),
            }
        }

        let mut first: Option<FirstFetch> = None;
        for sub in subgroups {
            let destination = sub[0].destination.clone();

            let resolved = if let Some(head) = &first {
                let path = destination
                    .resolve(head.server_filename.as_deref(), &url)
                    .map_err(E::from)?;

                let needs_copy = match modified_time(&path) {
                    None => true,
                    Some(existing) => head.mtime.map(|mtime| mtime > existing).unwrap_or(false),
                };
                if needs_copy {
                    self.emit(FetchEvent::Copying {
                        from: &head.path,
                        to: &path,
                    });
                    debug!(from = %head.path.display(), to = %path.display(), "copying");
                    fs::copy(&head.path, &path).map_err(|source| {
                        E::from(FetchError::CopyFailed {
                            from: head.path.clone(),
                            to: path.clone(),
                            source,
                        })
                    })?;
                    if let Some(mtime) = head.mtime {
                        set_mtime(&path, mtime).map_err(E::from)?;
                    }
                }
                path
            } else {
                self.emit(FetchEvent::Checking { url: &url });
                debug!(%url, "checking");
                let response = self.transport.fetch(&url).map_err(E::from)?;

                let server_filename = response.server_filename();
                let path = destination
                    .resolve(server_filename.as_deref(), &url)
                    .map_err(E::from)?;

                if !is_fresh(&path, response.last_modified) {
                    self.emit(FetchEvent::Downloading {
                        from: &response.resolved_url,
                        to: &path,
                    });
                    debug!(from = %response.resolved_url, to = %path.display(), "downloading");
                    write_body(response.body, &path).map_err(E::from)?;
                    if let Some(last_modified) = response.last_modified {
                        set_mtime(&path, last_modified).map_err(E::from)?;
                    }
                }

                first = Some(FirstFetch {
                    path: path.clone(),
                    mtime: modified_time(&path),
                    server_filename,
                });
                path
            };

            for action in sub {
                (action.continuation)(&mut self.queue, &resolved)?;
            }
        }

        Ok(())
    }

    fn emit(&self, event: FetchEvent<'_>) {
        if let Some(handler) = &self.on_event {
            handler(event);
        }
    }
}

fn write_body(mut body: Box<dyn Read>, path: &Path) -> Result<(), FetchError> {
    let write_error = |source: io::Error| FetchError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_error)?;
    let mut writer = io::BufWriter::new(file);
    io::copy(&mut body, &mut writer).map_err(write_error)?;
    writer.flush().map_err(write_error)
}

fn set_mtime(path: &Path, mtime: SystemTime) -> Result<(), FetchError> {
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).map_err(|source| {
        FetchError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}

/// A destination is fresh when it exists and is no older than the remote
/// resource. A missing `Last-Modified` header cannot prove freshness, so
/// the transfer goes ahead.
fn is_fresh(path: &Path, last_modified: Option<SystemTime>) -> bool {
    match (modified_time(path), last_modified) {
        (Some(existing), Some(remote)) => existing >= remote,
        _ => false,
    }
}
