//! Command implementations.

pub mod info;
pub mod install;
pub mod list;

use npack::{find_lib_directory, InstallConfig, Url};

use crate::cli::RepositoryArgs;
use crate::error::CliError;

/// Turn the shared repository/lib-dir options into an install
/// configuration, searching upward for the lib directory when none was
/// given.
pub(crate) fn resolve_config(args: RepositoryArgs) -> Result<InstallConfig, CliError> {
    let lib_dir = match args.lib_dir {
        Some(directory) => directory,
        None => find_lib_directory()?,
    };

    match args.repository {
        Some(raw) => {
            let url = Url::parse(&raw)
                .map_err(|source| CliError::InvalidRepository { url: raw, source })?;
            Ok(InstallConfig::new(lib_dir, url))
        }
        None => Ok(InstallConfig::with_default_repository(lib_dir)),
    }
}
