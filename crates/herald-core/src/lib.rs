//! Herald Core - Core library for release automation
//!
//! This crate provides the error taxonomy, JSON configuration, shared types
//! and the small workflow helpers used by the Herald release tool.

pub mod config;
pub mod error;
pub mod types;
pub mod workflow;

pub use config::Config;
pub use error::{HeraldError, Result};
pub use types::{ReleaseMode, ReleaseType};
