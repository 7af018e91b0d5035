//! Manifest data model.
//!
//! These are the passive records produced by manifest parsing and consumed
//! by the registry and the install orchestrator:
//!
//! - [`Library`]: a single binary artifact reference
//! - [`Package`]: a named, versioned set of libraries
//! - [`Repository`]: one manifest's packages and import links

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod registry;

pub use registry::{PackageRegistry, RegisteredPackage};

/// A single library artifact belonging to a package.
///
/// `binary` is a URI reference resolved against the package's effective
/// master site. A `#fragment` suffix names an entry inside an archive
/// rather than a directly downloadable file:
///
/// ```
/// use npack::package::Library;
///
/// let library: Library =
///     serde_json::from_str(r#"{ "Binary": "NUnit-2.5.5.zip#bin/nunit.framework.dll" }"#).unwrap();
/// assert!(library.binary.contains('#'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Library {
    pub binary: String,
}

/// A package definition as declared in a manifest.
///
/// Immutable once parsed. `libraries` maps the local filename each artifact
/// is installed under to its source reference; a `BTreeMap` keeps iteration
/// deterministic so download scheduling and log output are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub maintainer: String,

    /// Base URIs that library references are resolved against.
    ///
    /// Only the first entry is consulted; it is itself resolved relative to
    /// the manifest's own location.
    pub master_sites: Vec<String>,

    /// Names of packages this one depends on.
    ///
    /// Recorded and reported, but never walked to auto-install
    /// dependencies; callers list everything they want explicitly.
    pub requires: Vec<String>,

    pub libraries: BTreeMap<String, Library>,
}

impl Package {
    /// The `name-version` form callers may use to request an exact version.
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// The in-memory form of one manifest document.
///
/// Transient: consumed by the registry-construction pass and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Repository {
    pub packages: Vec<Package>,

    /// URIs of further repository manifests to absorb, relative to this
    /// manifest's location.
    pub repository_imports: Vec<String>,

    /// URIs of single-package manifests to absorb.
    pub package_imports: Vec<String>,
}

impl Repository {
    /// Wrap a single package as a repository, for manifest formats that
    /// hold one package per document.
    pub fn from_package(package: Package) -> Self {
        Self {
            packages: vec![package],
            ..Default::default()
        }
    }
}
