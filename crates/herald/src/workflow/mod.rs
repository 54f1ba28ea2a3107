//! Release orchestration over git, the changelog and GitHub

mod release;
#[cfg(test)]
mod test_support;
mod version;

pub use release::{ReleaseOptions, ReleasePlan, ReleaseWorkflow};
pub use version::resolve_version;
