use serde::{Deserialize, Serialize};

/// A commit proposed by the plan oracle: one logical group of changed files
/// plus a conventional-commit type and message. Never persisted; consumed
/// exactly once when it is staged and committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposedCommit {
    /// Conventional-commit type as returned by the oracle. Kept as a raw
    /// string so an invalid type surfaces as a validation error, not a
    /// parse error.
    #[serde(rename = "type")]
    pub commit_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub files: Vec<String>,
}

/// Overall strategy declared by a rewrite plan. Unknown strategies are
/// rejected at the parse boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Squash,
    Reorder,
    Split,
    Drop,
}

/// Per-file change summary inside a rewritten commit. Informational only;
/// the applier never derives tree content from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileChange {
    pub file: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "type", default)]
    pub change_type: String,
}

/// One commit of the rewritten history the oracle proposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewrittenCommit {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub changes: Vec<FileChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// A history rewrite plan, applied against a specific linear commit range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewritePlan {
    pub rewritten_commits: Vec<RewrittenCommit>,
    pub merge_strategy: MergeStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A message amendment for an existing commit, keyed by its original sha.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Amendment {
    pub sha: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// An unpushed commit as listed for amendment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitMeta {
    pub sha: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// A commit with its full diff, as fed to the oracle for a rewrite plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitRecord {
    pub hash: String,
    /// Subject and body joined with a blank line.
    pub message: String,
    pub diff: String,
}

/// Result of applying a rewrite plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Empty commit range; nothing to do.
    Noop,
    /// Range discarded, branch reset to its base parent.
    Dropped,
    /// Range collapsed into a single new commit.
    Squashed,
    /// Messages rewritten one-for-one, trees untouched.
    Rewritten,
}

impl ApplyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyOutcome::Noop => "noop",
            ApplyOutcome::Dropped => "dropped",
            ApplyOutcome::Squashed => "squashed",
            ApplyOutcome::Rewritten => "rewritten",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_plan_parses_camel_case() {
        let plan: RewritePlan = serde_json::from_str(
            r#"{
                "rewrittenCommits": [
                    {"title": "Add parser", "description": "d", "changes": [
                        {"file": "src/parse.rs", "summary": "new", "type": "add"}
                    ], "rationale": "one unit"}
                ],
                "mergeStrategy": "squash",
                "notes": "n"
            }"#,
        )
        .unwrap();
        assert_eq!(plan.merge_strategy, MergeStrategy::Squash);
        assert_eq!(plan.rewritten_commits.len(), 1);
        assert_eq!(plan.rewritten_commits[0].changes[0].change_type, "add");
    }

    #[test]
    fn rewrite_plan_rejects_unknown_strategy() {
        let err = serde_json::from_str::<RewritePlan>(
            r#"{"rewrittenCommits": [], "mergeStrategy": "rebase"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rewrite_plan_requires_strategy() {
        let err = serde_json::from_str::<RewritePlan>(r#"{"rewrittenCommits": []}"#);
        assert!(err.is_err());
    }

    #[test]
    fn proposed_commit_optional_body() {
        let c: ProposedCommit =
            serde_json::from_str(r#"{"type": "fix", "title": "patch bug", "files": ["b.rs"]}"#)
                .unwrap();
        assert_eq!(c.commit_type, "fix");
        assert!(c.body.is_none());
    }
}
