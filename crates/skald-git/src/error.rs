/// Failure of an underlying `git` invocation. Non-zero exits carry the
/// combined captured output so callers can surface it verbatim.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("`git {cmd}` failed: {output}")]
    CommandFailed { cmd: String, output: String },
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}
