//! Exit codes for the CLI

use herald_core::error::WorkflowError;
use herald_core::HeraldError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Version error
pub const VERSION_ERROR: i32 = 4;

/// A release precondition was not met
pub const VALIDATION_ERROR: i32 = 5;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Map a command failure to a process exit code
pub fn for_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<HeraldError>() {
        Some(HeraldError::Config(_)) => CONFIG_ERROR,
        Some(HeraldError::Git(_)) => GIT_ERROR,
        Some(HeraldError::Version(_)) => VERSION_ERROR,
        Some(HeraldError::Workflow(WorkflowError::Cancelled)) => CANCELLED,
        Some(HeraldError::Workflow(WorkflowError::PreConditionFailed(_))) => VALIDATION_ERROR,
        _ => match error.downcast_ref::<herald_core::error::GitError>() {
            Some(_) => GIT_ERROR,
            None => ERROR,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::error::{ConfigError, GitError};

    #[test]
    fn test_exit_code_mapping() {
        let config: anyhow::Error = HeraldError::Config(ConfigError::NotFound("x".into())).into();
        assert_eq!(for_error(&config), CONFIG_ERROR);

        let cancelled: anyhow::Error = HeraldError::Workflow(WorkflowError::Cancelled).into();
        assert_eq!(for_error(&cancelled), CANCELLED);

        let precondition: anyhow::Error =
            HeraldError::Workflow(WorkflowError::PreConditionFailed("dirty".into())).into();
        assert_eq!(for_error(&precondition), VALIDATION_ERROR);

        let git: anyhow::Error = GitError::TagExists("v1.0.0".into()).into();
        assert_eq!(for_error(&git), GIT_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
