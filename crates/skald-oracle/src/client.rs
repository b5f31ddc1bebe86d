//! OpenAI Responses API client and the [`Oracle`] trait.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use skald_core::{validate_proposed, validate_subject, Amendment, CommitMeta, CommitRecord,
    ProposedCommit, RewritePlan};
use tracing::debug;

use crate::error::OracleError;
use crate::parse::extract_json;
use crate::prompts;

/// Model used for commit and rewrite planning.
pub const OPENAI_MODEL: &str = "gpt-4.1";

const API_URL: &str = "https://api.openai.com/v1/responses";
const API_KEY_VAR: &str = "OPEN_AI_API_KEY";
const TIMEOUT: Duration = Duration::from_secs(120);

/// The external plan oracle. One production implementation talks to
/// OpenAI; tests substitute canned plans.
pub trait Oracle {
    /// Propose grouped commits for the given changed files and diff.
    /// Entries that fail validation are dropped with a warning.
    fn commit_plan(
        &self,
        files: &[String],
        diff: &str,
    ) -> Result<Vec<ProposedCommit>, OracleError>;

    /// Propose message amendments for existing commits. Every returned sha
    /// must reference an input commit and every subject must be a valid
    /// conventional-commit subject.
    fn amendments(&self, commits: &[CommitMeta]) -> Result<Vec<Amendment>, OracleError>;

    /// Propose a history rewrite plan for a commit range with diffs.
    fn fix_plan(&self, commits: &[CommitRecord]) -> Result<RewritePlan, OracleError>;
}

pub struct OpenAiClient {
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Build a client from `OPEN_AI_API_KEY` in the environment, falling
    /// back to a `.env` file in the working directory. Missing key is
    /// fatal here, before any network attempt.
    pub fn from_env() -> Result<Self, OracleError> {
        let api_key = api_key_from_env()?;
        Ok(Self {
            api_key,
            model: OPENAI_MODEL.to_string(),
        })
    }

    fn responses(&self, input: &str) -> Result<String, OracleError> {
        debug!(target: "skald::oracle", model = %self.model, bytes = input.len(), "sending request");
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .new_agent();
        let body = serde_json::json!({ "model": self.model, "input": input });
        let mut response = agent
            .post(API_URL)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(body.to_string())
            .map_err(|e| OracleError::Http(e.to_string()))?;
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| OracleError::Http(e.to_string()))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        Ok(output_text(&value))
    }
}

impl Oracle for OpenAiClient {
    fn commit_plan(
        &self,
        files: &[String],
        diff: &str,
    ) -> Result<Vec<ProposedCommit>, OracleError> {
        let raw = self.responses(&prompts::commit_generation(files, diff))?;
        parse_commit_plan(&raw)
    }

    fn amendments(&self, commits: &[CommitMeta]) -> Result<Vec<Amendment>, OracleError> {
        let commits_json = serde_json::to_string_pretty(commits)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        let raw = self.responses(&prompts::amendment(&commits_json))?;
        parse_amendments(&raw, commits)
    }

    fn fix_plan(&self, commits: &[CommitRecord]) -> Result<RewritePlan, OracleError> {
        let commits_json = serde_json::to_string_pretty(commits)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        let raw = self.responses(&prompts::fix(&commits_json))?;
        parse_fix_plan(&raw)
    }
}

/// Parse and validate a commit plan from raw model text.
pub fn parse_commit_plan(raw: &str) -> Result<Vec<ProposedCommit>, OracleError> {
    let value = extract_json(raw)?;
    let proposed: Vec<ProposedCommit> = serde_json::from_value(value)
        .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
    let mut valid = Vec::new();
    for commit in proposed {
        match validate_proposed(&commit) {
            Ok(_) => valid.push(commit),
            Err(e) => eprintln!("Dropping invalid proposed commit \"{}\": {e}", commit.title),
        }
    }
    Ok(valid)
}

/// Parse amendments from raw model text and check them against the input
/// commits.
pub fn parse_amendments(
    raw: &str,
    commits: &[CommitMeta],
) -> Result<Vec<Amendment>, OracleError> {
    let value = extract_json(raw)?;
    let amendments: Vec<Amendment> = serde_json::from_value(value)
        .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
    for a in &amendments {
        if !commits.iter().any(|c| c.sha == a.sha) {
            return Err(OracleError::RejectedPlan(format!(
                "Amendment references unknown sha: {}",
                a.sha
            )));
        }
        validate_subject(&a.subject).map_err(|e| OracleError::RejectedPlan(e.to_string()))?;
    }
    Ok(amendments)
}

/// Parse a rewrite plan from raw model text.
pub fn parse_fix_plan(raw: &str) -> Result<RewritePlan, OracleError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|e| OracleError::MalformedResponse(e.to_string()))
}

/// Concatenated `output_text` content of a Responses API payload.
fn output_text(value: &Value) -> String {
    let mut text = String::new();
    if let Some(items) = value.get("output").and_then(Value::as_array) {
        for item in items {
            if let Some(parts) = item.get("content").and_then(Value::as_array) {
                for part in parts {
                    if let Some(t) = part.get("text").and_then(Value::as_str) {
                        text.push_str(t);
                    }
                }
            }
        }
    }
    if text.is_empty() {
        if let Some(t) = value.get("output_text").and_then(Value::as_str) {
            text.push_str(t);
        }
    }
    text
}

fn api_key_from_env() -> Result<String, OracleError> {
    if let Ok(key) = std::env::var(API_KEY_VAR) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Ok(key);
        }
    }
    if let Some(key) = read_env_file(Path::new(".env"), API_KEY_VAR) {
        return Ok(key);
    }
    Err(OracleError::MissingApiKey)
}

/// Read `wanted` from a `KEY=value` env file. Comments and malformed lines
/// are skipped; surrounding quotes are stripped.
fn read_env_file(path: &Path, wanted: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == wanted {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
