use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure of a filesystem gateway call.
///
/// Every variant is an I/O failure as far as the store is concerned: it is
/// shown to the user and never retried.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Path does not exist: {0:?}")]
    NotFound(PathBuf),

    #[error("Path is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Cannot get parent directory of {0:?}")]
    NoParent(PathBuf),
}

impl GatewayError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GatewayError::Io {
            path: path.into(),
            source,
        }
    }
}
