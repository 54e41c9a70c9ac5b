//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent invalid command input.
/// They are independent of configuration and transport concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid principal '{token}': expected format TYPE=UUID")]
    InvalidPrincipalFormat { token: String },

    #[error("invalid principal '{token}': type must be one of {allowed}")]
    UnknownPrincipalType { token: String, allowed: String },

    #[error("invalid principal '{token}': value must be a UUID")]
    InvalidPrincipalId { token: String },

    #[error("invalid log level '{value}': must be one of {allowed}")]
    UnknownLogLevel { value: String, allowed: String },

    #[error("directories are not supported, specify file paths: [{}]", join_paths(.0))]
    DirectoriesNotSupported(Vec<PathBuf>),

    #[error("files not found: [{}]", join_paths(.0))]
    FilesNotFound(Vec<PathBuf>),

    #[error("at least one {0} is required")]
    MissingValues(&'static str),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
