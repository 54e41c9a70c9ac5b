//! kuflowctl: command line client for KuFlow task actions
//!
//! Resolves connection settings from flags, environment files and
//! environment variables, then issues one task mutation per invocation.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
