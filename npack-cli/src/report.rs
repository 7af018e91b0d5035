//! Console progress output.

use std::cell::Cell;
use std::io::{self, Write};
use std::path::Path;

use npack::{InstallPhase, InstallReporter};
use tracing::debug;
use url::Url;

/// Prints install progress in the classic operator format: a `[   1 ] `
/// indicator per scheduler step, with the step's first activity line on
/// the same row and the rest indented beneath it.
pub struct ConsoleReporter {
    needs_indent: Cell<bool>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            needs_indent: Cell::new(false),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallReporter for ConsoleReporter {
    fn on_phase(&self, phase: InstallPhase) {
        debug!(%phase, "phase");
    }

    fn on_step(&self, number: u32) {
        print!("[ {:3} ] ", number);
        io::stdout().flush().ok();
        self.needs_indent.set(false);
    }

    fn on_message(&self, message: &str) {
        if self.needs_indent.get() {
            println!("        {message}");
        } else {
            println!("{message}");
            self.needs_indent.set(true);
        }
    }

    fn on_installed(&self, url: &Url, path: &Path) {
        println!(" ***    Installed {} to {}", url, path.display());
        self.needs_indent.set(true);
    }
}
