//! Name and name-version index over registered packages.

use std::collections::HashMap;

use url::Url;

use super::Package;

/// A package together with the location of the manifest that declared it.
///
/// The manifest URL is the base that `master_sites` entries and relative
/// binary references resolve against at install time.
#[derive(Debug, Clone)]
pub struct RegisteredPackage {
    pub package: Package,
    pub manifest_url: Url,
}

/// Case-insensitive index of every package absorbed during registry
/// construction.
///
/// Two key spaces exist side by side: the bare package name, and the
/// `name-version` form. The bare-name key always points at the package
/// whose version string is ordinally greatest among all registered
/// versions of that name (case-insensitive string comparison, ties going
/// to the later registration). This is deliberately not semver-aware.
///
/// The registry only ever grows; once the construction pass completes it
/// is handed out by value and treated as read-only.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: Vec<RegisteredPackage>,
    by_name: HashMap<String, usize>,
    by_name_version: HashMap<String, usize>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package parsed out of the manifest at `manifest_url`.
    pub fn register(&mut self, package: Package, manifest_url: Url) {
        let name_key = package.name.to_lowercase();
        let versioned_key = package.full_name().to_lowercase();
        let version_key = package.version.to_lowercase();

        let index = self.packages.len();
        self.packages.push(RegisteredPackage {
            package,
            manifest_url,
        });

        match self.by_name.get(&name_key) {
            Some(&existing)
                if self.packages[existing].package.version.to_lowercase() > version_key => {}
            _ => {
                self.by_name.insert(name_key, index);
            }
        }
        self.by_name_version.insert(versioned_key, index);
    }

    /// Look up a package by bare name or `name-version`, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredPackage> {
        let key = name.to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_name_version.get(&key))
            .map(|&index| &self.packages[index])
    }

    /// The latest version of every distinct package name, sorted by name.
    pub fn latest(&self) -> Vec<&RegisteredPackage> {
        let mut keys: Vec<&String> = self.by_name.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| &self.packages[self.by_name[key]])
            .collect()
    }

    /// Total number of registered package records, counting every version.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
