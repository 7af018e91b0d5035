//! The `info` command: describe one package.

use npack::{InstallError, Installer};

use crate::cli::InfoArgs;
use crate::error::CliError;
use crate::report::ConsoleReporter;

use super::resolve_config;

pub fn run(args: InfoArgs) -> Result<(), CliError> {
    let config = resolve_config(args.repository)?;
    let installer = Installer::new(config);
    let reporter = ConsoleReporter::new();

    let registry = installer.build_registry(&reporter)?;
    let entry = registry
        .lookup(&args.package)
        .ok_or_else(|| InstallError::PackageNotFound {
            name: args.package.clone(),
        })?;

    let package = &entry.package;
    println!();
    println!("Name:        {}", package.name);
    println!("Version:     {}", package.version);
    if !package.description.is_empty() {
        println!("Description: {}", package.description);
    }
    if !package.author.is_empty() {
        println!("Author:      {}", package.author);
    }
    if !package.maintainer.is_empty() {
        println!("Maintainer:  {}", package.maintainer);
    }
    if !package.requires.is_empty() {
        println!("Requires:    {}", package.requires.join(", "));
    }
    println!("Manifest:    {}", entry.manifest_url);
    if !package.libraries.is_empty() {
        println!("Libraries:");
        for (filename, library) in &package.libraries {
            println!("    {:<32} {}", filename, library.binary);
        }
    }
    Ok(())
}
