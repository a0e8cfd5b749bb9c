use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop a yamlfix run
#[derive(Debug, Error)]
pub enum Error {
    /// Contradictory command line input
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to fix files: {0}")]
    Format(#[source] io::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) => 2,
            _ => 1,
        }
    }
}
