//! CLI commands

mod changelog;
mod init;
mod release;
mod validate;
mod version;

pub use changelog::ChangelogCommand;
pub use init::InitCommand;
pub use release::ReleaseCommand;
pub use validate::ValidateCommand;
pub use version::VersionCommand;
