//! Conventional-commit validation for oracle-proposed commits.
//!
//! Pure and synchronous; a proposed commit must pass here before any file
//! is staged on its behalf.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ProposedCommit;

/// Closed set of accepted conventional-commit types.
pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "build", "ci", "chore", "revert",
];

static SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert)(\(.+\))?: .+$")
        .unwrap()
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid commit type: {0}")]
    InvalidType(String),
    #[error("Commit title is required")]
    MissingTitle,
    #[error("Commit title must be less than 75 characters")]
    TitleTooLong,
    #[error("Commit files are required")]
    MissingFiles,
    #[error("Commit subject must match the format: <type>(<scope>): <subject>")]
    BadSubject,
}

/// Validate a proposed commit and return its composed subject line
/// (`"<type>: <title>"`).
pub fn validate_proposed(commit: &ProposedCommit) -> Result<String, ValidationError> {
    if !COMMIT_TYPES.contains(&commit.commit_type.as_str()) {
        return Err(ValidationError::InvalidType(commit.commit_type.clone()));
    }
    if commit.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if commit.title.chars().count() > 75 {
        return Err(ValidationError::TitleTooLong);
    }
    if commit.files.is_empty() {
        return Err(ValidationError::MissingFiles);
    }

    let subject = format!("{}: {}", commit.commit_type, commit.title);
    if !SUBJECT_RE.is_match(&subject) {
        return Err(ValidationError::BadSubject);
    }
    Ok(subject)
}

/// Validate a bare commit subject line against the conventional format.
pub fn validate_subject(subject: &str) -> Result<(), ValidationError> {
    if !SUBJECT_RE.is_match(subject) {
        return Err(ValidationError::BadSubject);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposed(commit_type: &str, title: &str, files: &[&str]) -> ProposedCommit {
        ProposedCommit {
            commit_type: commit_type.to_string(),
            title: title.to_string(),
            body: None,
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn valid_commit_returns_subject() {
        let subject = validate_proposed(&proposed("feat", "add thing", &["a.rs"])).unwrap();
        assert_eq!(subject, "feat: add thing");
    }

    #[test]
    fn invalid_type_rejected() {
        let err = validate_proposed(&proposed("oops", "x", &["a.rs"])).unwrap_err();
        assert_eq!(err, ValidationError::InvalidType("oops".to_string()));
        assert_eq!(err.to_string(), "Invalid commit type: oops");
    }

    #[test]
    fn empty_title_rejected() {
        let err = validate_proposed(&proposed("feat", "  ", &["a.rs"])).unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);
    }

    #[test]
    fn long_title_rejected() {
        let title = "x".repeat(76);
        let err = validate_proposed(&proposed("feat", &title, &["a.rs"])).unwrap_err();
        assert_eq!(err, ValidationError::TitleTooLong);
        // 75 exactly is still fine.
        let title = "x".repeat(75);
        assert!(validate_proposed(&proposed("feat", &title, &["a.rs"])).is_ok());
    }

    #[test]
    fn files_required() {
        let err = validate_proposed(&proposed("feat", "missing files", &[])).unwrap_err();
        assert_eq!(err, ValidationError::MissingFiles);
    }

    #[test]
    fn subject_line_validation() {
        assert!(validate_subject("feat: add login").is_ok());
        assert!(validate_subject("fix(auth): handle expiry").is_ok());
        assert!(validate_subject("revert: feat: add login").is_ok());
        assert!(validate_subject("added login").is_err());
        assert!(validate_subject("feat:missing space").is_err());
        assert!(validate_subject("feat: ").is_err());
    }
}
