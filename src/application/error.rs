//! Application-level errors (wraps domain, config and transport errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::DomainError;
use crate::infrastructure::error::TransportError;

/// Application errors wrap lower-layer errors and add command-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unable to upload file: {}", path.display())]
    UploadFailed {
        path: PathBuf,
        #[source]
        source: TransportError,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
