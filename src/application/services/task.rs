//! Task mutation service
//!
//! Maps each [`CommandIntent`] onto exactly one kind of task action. Document
//! uploads are validated up front and then sent one file at a time, stopping
//! at the first failure.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    CommandIntent, DomainError, ElementTarget, LogLevel, PrincipalItem, SaveElementCommand,
    SaveElementDocumentCommand, TaskLog,
};
use crate::infrastructure::traits::{FileSystem, TaskOperations};

/// Executes command intents against the task API.
pub struct TaskService {
    tasks: Arc<dyn TaskOperations>,
    fs: Arc<dyn FileSystem>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskOperations>, fs: Arc<dyn FileSystem>) -> Self {
        Self { tasks, fs }
    }

    /// Dispatch an intent to its task action.
    #[instrument(level = "debug", skip_all, fields(command = intent.name(), task_id = %intent.task_id()))]
    pub fn execute(&self, intent: &CommandIntent) -> ApplicationResult<()> {
        match intent {
            CommandIntent::SaveField { target, values } => self.save_field(target, values),
            CommandIntent::SaveDocument {
                target,
                paths,
                document_id,
            } => self.save_documents(target, paths, *document_id),
            CommandIntent::SaveDocumentByReference { target, uris } => {
                self.save_document_references(target, uris)
            }
            CommandIntent::SavePrincipal { target, principals } => {
                self.save_principals(target, principals)
            }
            CommandIntent::AppendLog {
                task_id,
                level,
                message,
            } => self.append_log(*task_id, *level, message),
        }
    }

    pub fn save_field(&self, target: &ElementTarget, values: &[String]) -> ApplicationResult<()> {
        if values.is_empty() {
            return Err(DomainError::MissingValues("value").into());
        }
        let command = SaveElementCommand::strings(target, values);
        self.tasks.save_element(target.task_id, &command)?;
        info!("saved {} field value(s) on task {}", values.len(), target.task_id);
        Ok(())
    }

    /// Upload each file as a document value.
    ///
    /// All paths are checked before the first upload: any directory or
    /// missing file rejects the whole command.
    pub fn save_documents(
        &self,
        target: &ElementTarget,
        paths: &[PathBuf],
        document_id: Option<Uuid>,
    ) -> ApplicationResult<()> {
        if paths.is_empty() {
            return Err(DomainError::MissingValues("file").into());
        }

        let directories: Vec<PathBuf> = paths
            .iter()
            .filter(|p| self.fs.is_dir(p))
            .cloned()
            .collect();
        if !directories.is_empty() {
            return Err(DomainError::DirectoriesNotSupported(directories).into());
        }

        let missing: Vec<PathBuf> = paths
            .iter()
            .filter(|p| !self.fs.exists(p))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::FilesNotFound(missing).into());
        }

        let element_value_id = match document_id {
            Some(id) if paths.len() == 1 => Some(id),
            Some(id) => {
                warn!("ignoring document id {id}: it only applies to a single file");
                None
            }
            None => None,
        };
        let command = SaveElementDocumentCommand {
            element_definition_code: target.element_code.clone(),
            element_value_id,
            element_value_valid: target.valid,
        };

        for path in paths {
            debug!("uploading {}", path.display());
            self.tasks
                .save_element_document(target.task_id, &command, path)
                .map_err(|source| ApplicationError::UploadFailed {
                    path: path.clone(),
                    source,
                })?;
        }
        info!("uploaded {} document(s) to task {}", paths.len(), target.task_id);
        Ok(())
    }

    pub fn save_document_references(
        &self,
        target: &ElementTarget,
        uris: &[String],
    ) -> ApplicationResult<()> {
        if uris.is_empty() {
            return Err(DomainError::MissingValues("document reference").into());
        }
        let command = SaveElementCommand::documents(target, uris);
        self.tasks.save_element(target.task_id, &command)?;
        info!("saved {} document reference(s) on task {}", uris.len(), target.task_id);
        Ok(())
    }

    pub fn save_principals(
        &self,
        target: &ElementTarget,
        principals: &[PrincipalItem],
    ) -> ApplicationResult<()> {
        if principals.is_empty() {
            return Err(DomainError::MissingValues("principal").into());
        }
        let command = SaveElementCommand::principals(target, principals);
        self.tasks.save_element(target.task_id, &command)?;
        info!("saved {} principal(s) on task {}", principals.len(), target.task_id);
        Ok(())
    }

    pub fn append_log(&self, task_id: Uuid, level: LogLevel, message: &str) -> ApplicationResult<()> {
        let log = TaskLog {
            level,
            message: message.to_string(),
        };
        self.tasks.append_log(task_id, &log)?;
        info!("appended {level} log to task {task_id}");
        Ok(())
    }
}
