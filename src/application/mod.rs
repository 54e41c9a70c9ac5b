//! Application layer: services and use cases
//!
//! This layer turns command intents into REST calls through I/O boundary traits.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
