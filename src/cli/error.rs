//! CLI-level errors (wraps application errors)

use std::error::Error as _;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::config::ConfigError;
use crate::infrastructure::error::TransportError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Application(e.into())
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Application(e.into())
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_) => crate::exitcode::USAGE,
                ApplicationError::Config(_) => crate::exitcode::CONFIG,
                ApplicationError::Transport(t) => transport_exit_code(t),
                ApplicationError::UploadFailed { source, .. } => transport_exit_code(source),
            },
        }
    }

    /// Message followed by its `source()` chain, joined with `": "`.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

fn transport_exit_code(e: &TransportError) -> i32 {
    match e {
        TransportError::InvalidEndpoint { .. } => crate::exitcode::CONFIG,
        TransportError::Io { .. } => crate::exitcode::IOERR,
        _ => crate::exitcode::UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::DomainError;
    use crate::exitcode;

    fn upload_failed(source: TransportError) -> CliError {
        ApplicationError::UploadFailed {
            path: PathBuf::from("a.txt"),
            source,
        }
        .into()
    }

    #[test]
    fn given_error_layers_when_mapping_then_uses_sysexits() {
        assert_eq!(
            CliError::from(ApplicationError::from(DomainError::MissingValues("value"))).exit_code(),
            exitcode::USAGE
        );
        assert_eq!(
            CliError::from(ConfigError::Environment("x".into())).exit_code(),
            exitcode::CONFIG
        );
        assert_eq!(
            CliError::from(TransportError::Unauthorized).exit_code(),
            exitcode::UNAVAILABLE
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            upload_failed(TransportError::io("read a.txt", io)).exit_code(),
            exitcode::IOERR
        );
    }

    #[test]
    fn given_upload_failure_when_reporting_then_includes_source_chain() {
        let err = upload_failed(TransportError::Server {
            status: 500,
            body: "boom".to_string(),
        });

        assert_eq!(
            err.report(),
            "unable to upload file: a.txt: server error: HTTP 500: boom"
        );
    }
}
