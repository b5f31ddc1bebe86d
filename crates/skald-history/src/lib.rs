//! Applies externally-generated commit plans to a repository. New objects
//! are created first and the branch pointer moves last, so any failure
//! short of the final reset leaves the branch untouched.

pub mod apply;
pub mod error;

pub use apply::{amend_commits, apply_proposed_commits, apply_rewrite_plan};
pub use error::RewriteError;
