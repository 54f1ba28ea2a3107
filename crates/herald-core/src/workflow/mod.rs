//! Workflow helpers for Herald

mod changelog;
mod version;

pub use changelog::*;
pub use version::*;
