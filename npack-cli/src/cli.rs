//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "npack",
    version,
    about = "Fetches packages and installs their libraries into a local lib tree"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install packages into the lib directory
    Install(InstallArgs),

    /// List the packages available in the repository
    List(RepositoryArgs),

    /// Show details for a single package
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Packages to install, as `name` or `name-version`
    #[arg(required = true, value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Package name to describe
    #[arg(value_name = "PACKAGE")]
    pub package: String,
}

/// Options shared by every command that consults the repository.
#[derive(Debug, Args)]
pub struct RepositoryArgs {
    /// URL of the packages.js repository file
    #[arg(short = 'r', long = "repository", value_name = "URL")]
    pub repository: Option<String>,

    /// Lib directory to work in (found by walking up from the current
    /// directory when omitted)
    #[arg(long = "lib-dir", value_name = "DIR")]
    pub lib_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_parses_names_and_repository() {
        let cli = Cli::try_parse_from([
            "npack",
            "install",
            "-r",
            "http://example.com/packages.js",
            "nunit",
            "log4net-1.2.10",
        ])
        .unwrap();

        match cli.command {
            Command::Install(args) => {
                assert_eq!(
                    args.repository.repository.as_deref(),
                    Some("http://example.com/packages.js")
                );
                assert_eq!(args.packages, vec!["nunit", "log4net-1.2.10"]);
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_install_requires_at_least_one_package() {
        assert!(Cli::try_parse_from(["npack", "install"]).is_err());
    }

    #[test]
    fn test_list_accepts_lib_dir() {
        let cli = Cli::try_parse_from(["npack", "list", "--lib-dir", "/tmp/lib"]).unwrap();
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.lib_dir.as_deref(), Some(std::path::Path::new("/tmp/lib")));
            }
            _ => panic!("expected list"),
        }
    }
}
