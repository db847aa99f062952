//! Shared runtime services: configuration, errors, and logging.

pub mod config;
pub mod error;
pub mod logging;
