//! Repository accessor backed by the `git` binary. Every invocation passes
//! an argv array directly to `git`; no shell is ever involved.

pub mod error;
pub mod repo;

pub use error::GitError;
pub use repo::{Repo, SystemGit};
