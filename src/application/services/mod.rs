//! Application services
//!
//! Services depend on I/O boundary traits (TaskOperations, FileSystem)
//! but are themselves concrete structs, not traits.

mod task;

pub use task::TaskService;
