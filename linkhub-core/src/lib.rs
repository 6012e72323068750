//! Core shared library for the LinkHub platform.
//!
//! This crate exposes reusable primitives the service depends on: common
//! errors, configuration loading, database abstractions and logging setup.

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;

pub use errors::{LinkHubError, Result as CoreResult};
