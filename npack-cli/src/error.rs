//! CLI error type.

use std::error::Error;
use std::fmt;

use npack::InstallError;

/// Errors surfaced to the user as a message and a non-zero exit code.
#[derive(Debug)]
pub enum CliError {
    /// The install run (or registry pass) failed.
    Install(InstallError),

    /// The `--repository` argument was not a valid URL.
    InvalidRepository {
        url: String,
        source: url::ParseError,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Install(error) => write!(f, "{error}"),
            CliError::InvalidRepository { url, source } => {
                write!(f, "invalid repository URL {url}: {source}")
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            // Display already shows these errors' own messages; expose
            // only the causes beneath them.
            CliError::Install(error) => error.source(),
            CliError::InvalidRepository { .. } => None,
        }
    }
}

impl From<InstallError> for CliError {
    fn from(error: InstallError) -> Self {
        CliError::Install(error)
    }
}
