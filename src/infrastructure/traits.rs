//! I/O boundary traits for testability
//!
//! These traits abstract the REST API and the filesystem, allowing the
//! task service to be tested with recording implementations.

use std::path::Path;

use uuid::Uuid;

use crate::domain::{SaveElementCommand, SaveElementDocumentCommand, TaskLog};
use crate::infrastructure::error::TransportResult;

/// Task mutation calls of the KuFlow REST API.
pub trait TaskOperations: Send + Sync {
    /// Save the values of a task element.
    fn save_element(&self, task_id: Uuid, command: &SaveElementCommand) -> TransportResult<()>;

    /// Upload a file as the value of a document element.
    fn save_element_document(
        &self,
        task_id: Uuid,
        command: &SaveElementDocumentCommand,
        file: &Path,
    ) -> TransportResult<()>;

    /// Append an entry to the task log.
    fn append_log(&self, task_id: Uuid, log: &TaskLog) -> TransportResult<()>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
