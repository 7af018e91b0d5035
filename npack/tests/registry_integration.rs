//! Integration tests for registry construction: breadth-first import
//! absorption, latest-version selection, and the import cycle guard.

mod common;

use npack::{InstallConfig, Installer, NullReporter, PackageRegistry, Repository};
use tempfile::TempDir;
use url::Url;

use common::{package, FakeTransport};

fn repository_json(repository: &Repository) -> Vec<u8> {
    serde_json::to_vec(repository).unwrap()
}

fn build(transport: &FakeTransport, root: &str, temp: &TempDir) -> PackageRegistry {
    let config = InstallConfig::new(temp.path().join("lib"), Url::parse(root).unwrap());
    let installer = Installer::with_transport(transport, config);
    installer.build_registry(&NullReporter).unwrap()
}

#[test]
fn test_imports_are_absorbed_to_arbitrary_depth() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/a/packages.js",
        repository_json(&Repository {
            packages: vec![package("alpha", "1.0")],
            repository_imports: vec!["../b/packages.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/b/packages.js",
        repository_json(&Repository {
            packages: vec![package("bravo", "1.0")],
            repository_imports: vec!["../c/packages.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/c/packages.js",
        repository_json(&Repository {
            packages: vec![package("charlie", "1.0")],
            ..Default::default()
        }),
    );

    let registry = build(&transport, "http://repo.test/a/packages.js", &temp);

    assert!(registry.lookup("alpha").is_some());
    assert!(registry.lookup("bravo").is_some());
    assert!(registry.lookup("charlie").is_some());
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_shallow_imports_resolve_before_deep_ones() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/root.js",
        repository_json(&Repository {
            repository_imports: vec!["mid.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/mid.js",
        repository_json(&Repository {
            repository_imports: vec!["leaf.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/leaf.js",
        repository_json(&Repository::default()),
    );

    build(&transport, "http://repo.test/root.js", &temp);

    assert_eq!(
        transport.fetched_urls(),
        vec![
            "http://repo.test/root.js".to_string(),
            "http://repo.test/mid.js".to_string(),
            "http://repo.test/leaf.js".to_string(),
        ]
    );
}

#[test]
fn test_bare_name_resolves_to_the_ordinally_greatest_version() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/packages.js",
        repository_json(&Repository {
            packages: vec![package("foo", "1.0"), package("foo", "2.0")],
            ..Default::default()
        }),
    );

    let registry = build(&transport, "http://repo.test/packages.js", &temp);

    assert_eq!(registry.lookup("foo").unwrap().package.version, "2.0");
    assert_eq!(registry.lookup("foo-1.0").unwrap().package.version, "1.0");
    assert_eq!(registry.lookup("foo-2.0").unwrap().package.version, "2.0");
}

#[test]
fn test_import_cycles_terminate_and_register_each_manifest_once() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/a.js",
        repository_json(&Repository {
            packages: vec![package("alpha", "1.0")],
            repository_imports: vec!["b.js".to_string(), "a.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/b.js",
        repository_json(&Repository {
            packages: vec![package("bravo", "1.0")],
            repository_imports: vec!["a.js".to_string()],
            ..Default::default()
        }),
    );

    let registry = build(&transport, "http://repo.test/a.js", &temp);

    assert_eq!(transport.fetch_count("http://repo.test/a.js"), 1);
    assert_eq!(transport.fetch_count("http://repo.test/b.js"), 1);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_duplicate_imports_are_fetched_once() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/root.js",
        repository_json(&Repository {
            repository_imports: vec!["shared.js".to_string(), "other.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/other.js",
        repository_json(&Repository {
            repository_imports: vec!["shared.js".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/shared.js",
        repository_json(&Repository {
            packages: vec![package("shared", "1.0")],
            ..Default::default()
        }),
    );

    let registry = build(&transport, "http://repo.test/root.js", &temp);

    assert_eq!(transport.fetch_count("http://repo.test/shared.js"), 1);
    assert!(registry.lookup("shared").is_some());
}

#[test]
fn test_package_imports_absorb_legacy_np_manifests() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/packages.js",
        repository_json(&Repository {
            package_imports: vec!["mono.options-0.2.1.np".to_string()],
            ..Default::default()
        }),
    );
    transport.insert_body(
        "http://repo.test/mono.options-0.2.1.np",
        "Name: mono.options\n\
         Version: 0.2.1\n\
         Master-Sites: http://mono.ximian.com/daily/\n\
         Library: Mono.Options.dll\n\
         \tBinary: monocharge-20100503.tar.gz#monocharge-20100503/2.0/Mono.Options.dll\n",
    );

    let registry = build(&transport, "http://repo.test/packages.js", &temp);

    let entry = registry.lookup("mono.options").unwrap();
    assert_eq!(entry.package.version, "0.2.1");
    assert_eq!(
        entry.manifest_url.as_str(),
        "http://repo.test/mono.options-0.2.1.np"
    );
    assert_eq!(
        entry.package.libraries["Mono.Options.dll"].binary,
        "monocharge-20100503.tar.gz#monocharge-20100503/2.0/Mono.Options.dll"
    );
}

#[test]
fn test_registry_pass_caches_manifests_in_the_archive_dir() {
    let temp = TempDir::new().unwrap();
    let mut transport = FakeTransport::new();

    transport.insert_body(
        "http://repo.test/packages.js",
        repository_json(&Repository::default()),
    );

    build(&transport, "http://repo.test/packages.js", &temp);

    assert!(temp.path().join("lib/.dist/packages.js").is_file());
}
