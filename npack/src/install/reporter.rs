//! Progress reporting for install runs.

use std::path::Path;

use url::Url;

use crate::fetch::FetchEvent;

use super::InstallPhase;

/// Receives operator-visible progress during an install run.
///
/// All methods default to no-ops, so implementations pick the events they
/// care about. The console frontend prints them in the classic
/// `[   1 ] Checking ...` format; tests collect them for assertions.
pub trait InstallReporter {
    /// A phase transition (registry construction, resolution, install).
    fn on_phase(&self, _phase: InstallPhase) {}

    /// A numbered scheduler step is about to run.
    fn on_step(&self, _number: u32) {}

    /// A line of activity within the current step.
    fn on_message(&self, _message: &str) {}

    /// A library reached its final location.
    fn on_installed(&self, _url: &Url, _path: &Path) {}
}

/// Reporter that discards everything.
pub struct NullReporter;

impl InstallReporter for NullReporter {}

/// Forward a scheduler event to a reporter as a message line, phrased the
/// way the console output has always phrased them.
pub(crate) fn report_fetch_event(reporter: &dyn InstallReporter, event: FetchEvent<'_>) {
    match event {
        FetchEvent::Checking { url } => reporter.on_message(&format!("Checking {url}")),
        FetchEvent::Downloading { from, to } => {
            reporter.on_message(&format!("Downloading from {} to {}", from, to.display()))
        }
        FetchEvent::Copying { from, to } => reporter.on_message(&format!(
            "Copying from {} to {}",
            from.display(),
            to.display()
        )),
    }
}
