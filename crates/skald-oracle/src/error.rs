#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("OPEN_AI_API_KEY is not set in the environment or .env file")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Http(String),
    #[error("could not parse JSON from model response: {0}")]
    MalformedResponse(String),
    /// A structurally valid response whose content violates the plan
    /// contract (e.g. an amendment for an unknown sha).
    #[error("{0}")]
    RejectedPlan(String),
}
