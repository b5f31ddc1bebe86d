use skald_git::GitError;

/// Fatal conditions for a history rewrite. All variants except `Git` are
/// raised before any branch pointer moves, leaving the repository as it
/// was.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Working tree not clean; commit or stash changes first.")]
    DirtyTree,
    #[error("History contains merges; linear rewrite only. Aborting.")]
    HistoryHasMerges,
    #[error(
        "Rewrite plan has {planned} commits but history has {actual}; \
         split/reorder not supported automatically. Please rerun with a compatible plan."
    )]
    UnsupportedPlan { planned: usize, actual: usize },
    #[error("Cannot drop range without a parent commit.")]
    NoParent,
    #[error("Rewrite plan provided an empty commit title.")]
    EmptyTitle,
    #[error(transparent)]
    Git(#[from] GitError),
}
