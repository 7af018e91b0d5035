//! The `install` command.

use npack::Installer;

use crate::cli::InstallArgs;
use crate::error::CliError;
use crate::report::ConsoleReporter;

use super::resolve_config;

pub fn run(args: InstallArgs) -> Result<(), CliError> {
    let config = resolve_config(args.repository)?;
    let installer = Installer::new(config);
    let reporter = ConsoleReporter::new();

    let report = installer.install(&args.packages, &reporter)?;

    println!();
    for package in &report.packages {
        println!(
            "{} {} ({} {}) -> {}",
            package.name,
            package.version,
            package.libraries,
            if package.libraries == 1 {
                "library"
            } else {
                "libraries"
            },
            package.path.display()
        );
    }
    Ok(())
}
