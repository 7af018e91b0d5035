//! The `list` command: show every package the repository offers.

use npack::Installer;

use crate::cli::RepositoryArgs;
use crate::error::CliError;
use crate::report::ConsoleReporter;

use super::resolve_config;

pub fn run(args: RepositoryArgs) -> Result<(), CliError> {
    let config = resolve_config(args)?;
    let installer = Installer::new(config);
    let reporter = ConsoleReporter::new();

    let registry = installer.build_registry(&reporter)?;

    println!();
    for entry in registry.latest() {
        let package = &entry.package;
        println!(
            "{:<24} {:<16} {}",
            package.name, package.version, package.description
        );
    }
    Ok(())
}
