pub mod types;
pub mod validate;

pub use types::*;
pub use validate::{validate_proposed, validate_subject, ValidationError, COMMIT_TYPES};
