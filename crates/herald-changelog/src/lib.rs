//! Herald Changelog - changelog model, templating and commit grouping
//!
//! - [`template`]: the mini template language used for every piece of
//!   generated text
//! - [`autolink`]: ticket mention linking
//! - [`document`]: Keep a Changelog parsing, section insertion and footer
//!   link maintenance
//! - [`diff`]: commit classification into changelog groups

pub mod autolink;
pub mod diff;
pub mod document;
pub mod release_notes;
pub mod tag;
pub mod template;

pub use autolink::AutoLinkRule;
pub use diff::{CommitGrouper, DiffGroup, RenderedGroup};
pub use document::{Changelog, CompareLinks, FooterLink, Section, DEFAULT_HEADER};
pub use release_notes::{ReleaseNotes, ReleaseNotesGenerator};
pub use tag::Tag;
pub use template::{render, Context, Template, TemplateLoader};
