//! Shared building blocks for the vobject workspace: settings, constants,
//! error types and logging setup.

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod types;
