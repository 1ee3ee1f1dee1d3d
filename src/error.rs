// Top-level error type. The binary exits with status 1 for every variant;
// the variant only decides how the message is written to stderr.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Missing required arguments. The message is the usage line itself.
    #[error("{0}")]
    Usage(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport failure or a response body that is not JSON.
    #[error(transparent)]
    Request(#[from] anyhow::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
