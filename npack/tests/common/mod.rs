//! Shared test fixtures: an in-memory transport, archive builders, and a
//! recording reporter.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

use flate2::write::GzEncoder;
use flate2::Compression;
use npack::fetch::{FetchError, FetchResponse, Transport};
use npack::{InstallReporter, Library, Package};
use url::Url;
use zip::write::SimpleFileOptions;

/// One canned response served by [`FakeTransport`].
#[derive(Default)]
pub struct FakeResource {
    pub body: Vec<u8>,
    pub last_modified: Option<SystemTime>,
    pub content_disposition_filename: Option<String>,
    /// Overrides the response URL, simulating a redirect.
    pub resolved_url: Option<String>,
}

impl FakeResource {
    pub fn with_body(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn last_modified(mut self, when: SystemTime) -> Self {
        self.last_modified = Some(when);
        self
    }
}

/// In-memory transport keyed by exact URL, recording every fetch.
#[derive(Default)]
pub struct FakeTransport {
    resources: HashMap<String, FakeResource>,
    fetched: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, resource: FakeResource) {
        self.resources.insert(url.to_string(), resource);
    }

    pub fn insert_body(&mut self, url: &str, body: impl Into<Vec<u8>>) {
        self.insert(url, FakeResource::with_body(body));
    }

    /// How many times `url` was fetched across all steps.
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .filter(|fetched| fetched.as_str() == url)
            .count()
    }

    pub fn total_fetches(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());

        let resource =
            self.resources
                .get(url.as_str())
                .ok_or_else(|| FetchError::FetchFailed {
                    url: url.to_string(),
                    reason: "no such resource".to_string(),
                })?;

        let resolved_url = match &resource.resolved_url {
            Some(resolved) => Url::parse(resolved).unwrap(),
            None => url.clone(),
        };

        Ok(FetchResponse {
            resolved_url,
            last_modified: resource.last_modified,
            content_disposition_filename: resource.content_disposition_filename.clone(),
            body: Box::new(Cursor::new(resource.body.clone())),
        })
    }
}

/// Reporter that records everything it is told, for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub steps: Mutex<Vec<u32>>,
    pub messages: Mutex<Vec<String>>,
    pub installed: Mutex<Vec<String>>,
}

impl InstallReporter for RecordingReporter {
    fn on_step(&self, number: u32) {
        self.steps.lock().unwrap().push(number);
    }

    fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn on_installed(&self, url: &Url, path: &Path) {
        self.installed
            .lock()
            .unwrap()
            .push(format!("{} -> {}", url, path.display()));
    }
}

/// Build a zip archive in memory.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Build a gzipped tar archive in memory.
pub fn tgz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A minimal package definition for manifest-building tests.
pub fn package(name: &str, version: &str) -> Package {
    Package {
        name: name.to_string(),
        version: version.to_string(),
        ..Default::default()
    }
}

/// Add a library entry to a package under construction.
pub fn with_library(mut package: Package, filename: &str, binary: &str) -> Package {
    package.libraries.insert(
        filename.to_string(),
        Library {
            binary: binary.to_string(),
        },
    );
    package
}
