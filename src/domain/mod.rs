//! Domain layer: command intents, principals and request payloads
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod principal;

pub use entities::*;
pub use error::DomainError;
pub use principal::parse_principal;
