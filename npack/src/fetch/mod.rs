//! Resource fetching: the download scheduler and its transport boundary.
//!
//! The scheduler is a worklist engine: callers enqueue
//! `(url, destination, continuation)` actions, then drive
//! [`DownloadScheduler::step`] to a fixed point. Within one step the
//! scheduler fetches each distinct URL at most once, satisfies further
//! destinations for the same URL by local copy, and skips transfers
//! entirely when the on-disk file is at least as new as the remote
//! resource.

mod error;
mod scheduler;
mod transport;

pub use error::FetchError;
pub use scheduler::{
    Continuation, Destination, DownloadScheduler, EventHandler, FetchEvent, Queue,
};
pub use transport::{FetchResponse, HttpTransport, Transport};
