//! Service container for dependency injection
//!
//! Wires the task service to its REST client and filesystem.

use std::sync::Arc;

use crate::application::services::TaskService;
use crate::config::ResolvedConfig;
use crate::infrastructure::error::TransportResult;
use crate::infrastructure::rest::KuFlowRestClient;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, TaskOperations};

/// Container holding the resolved configuration and its services.
///
/// Built once per invocation, after configuration resolution.
pub struct ServiceContainer {
    /// Resolved connection settings
    pub config: Arc<ResolvedConfig>,

    /// REST facade
    pub tasks: Arc<dyn TaskOperations>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a container backed by the KuFlow REST client.
    pub fn new(config: ResolvedConfig) -> TransportResult<Self> {
        let client = KuFlowRestClient::new(&config)?;
        Ok(Self::with_deps(
            config,
            Arc::new(client),
            Arc::new(RealFileSystem),
        ))
    }

    /// Create a container with custom dependencies (for testing).
    pub fn with_deps(
        config: ResolvedConfig,
        tasks: Arc<dyn TaskOperations>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tasks,
            fs,
        }
    }

    pub fn task_service(&self) -> TaskService {
        TaskService::new(Arc::clone(&self.tasks), Arc::clone(&self.fs))
    }
}
