//! Plan application against a linear commit range.

use skald_core::{
    validate_proposed, Amendment, ApplyOutcome, CommitRecord, MergeStrategy, ProposedCommit,
    RewritePlan,
};
use skald_git::Repo;
use tracing::debug;

use crate::error::RewriteError;

/// Default subject when a squash plan carries no rewritten commit entry.
const DEFAULT_SQUASH_TITLE: &str = "Rewrite commits";

/// Apply a rewrite plan to a linear range of commits (oldest first).
///
/// Precedence: drop, squash, count-mismatch refusal, message-only rewrite.
/// The message-only path keeps every original tree byte-for-byte; only
/// subjects and bodies change. The squash path deliberately commits the
/// tree currently checked out at HEAD, which the clean-tree precondition
/// makes equivalent to the range tip's tree.
pub fn apply_rewrite_plan(
    repo: &dyn Repo,
    commits: &[CommitRecord],
    plan: &RewritePlan,
) -> Result<ApplyOutcome, RewriteError> {
    if !repo.is_working_tree_clean()? {
        return Err(RewriteError::DirtyTree);
    }
    if commits.is_empty() {
        return Ok(ApplyOutcome::Noop);
    }

    let base_parent = repo.parents_of(&commits[0].hash)?.into_iter().next();

    // Refuse to rewrite merge history.
    let range = match repo.upstream_ref() {
        Some(upstream) => format!("{upstream}..HEAD"),
        None => format!(
            "{}..{}",
            base_parent.as_deref().unwrap_or(""),
            commits[commits.len() - 1].hash
        ),
    };
    if repo.range_has_merges(&range)? {
        return Err(RewriteError::HistoryHasMerges);
    }

    let rewritten = &plan.rewritten_commits;

    if plan.merge_strategy == MergeStrategy::Drop && rewritten.is_empty() {
        let base = base_parent.ok_or(RewriteError::NoParent)?;
        repo.reset_hard(&base)?;
        return Ok(ApplyOutcome::Dropped);
    }

    if plan.merge_strategy == MergeStrategy::Squash || rewritten.len() == 1 {
        let (title, body) = match rewritten.first() {
            Some(entry) if !entry.title.is_empty() => {
                (entry.title.clone(), entry.description.clone())
            }
            Some(entry) => (DEFAULT_SQUASH_TITLE.to_string(), entry.description.clone()),
            None => (DEFAULT_SQUASH_TITLE.to_string(), None),
        };
        let tree = repo.tree_of("HEAD")?;
        let new_sha = checked_commit_tree(repo, &tree, base_parent.as_deref(), &title, body.as_deref())?;
        repo.reset_hard(&new_sha)?;
        return Ok(ApplyOutcome::Squashed);
    }

    if rewritten.len() != commits.len() {
        return Err(RewriteError::UnsupportedPlan {
            planned: rewritten.len(),
            actual: commits.len(),
        });
    }

    // Message-only rewrite: original trees, new messages, chained from the
    // base parent. Objects first, pointer last.
    let mut parent = base_parent;
    for (entry, orig) in rewritten.iter().zip(commits) {
        let tree = repo.tree_of(&orig.hash)?;
        let sha = checked_commit_tree(
            repo,
            &tree,
            parent.as_deref(),
            &entry.title,
            entry.description.as_deref(),
        )?;
        debug!(target: "skald::history", orig = %orig.hash, new = %sha, "rewrote commit");
        parent = Some(sha);
    }
    match parent {
        Some(tip) => {
            repo.reset_hard(&tip)?;
            Ok(ApplyOutcome::Rewritten)
        }
        // The empty range was handled above; nothing to move.
        None => Ok(ApplyOutcome::Noop),
    }
}

fn checked_commit_tree(
    repo: &dyn Repo,
    tree: &str,
    parent: Option<&str>,
    title: &str,
    body: Option<&str>,
) -> Result<String, RewriteError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RewriteError::EmptyTitle);
    }
    let body = body.map(str::trim).filter(|b| !b.is_empty());
    Ok(repo.commit_tree(tree, parent, title, body)?)
}

/// Stage and commit each proposed commit in order. A commit that fails
/// validation, has no stageable files, or whose staging/commit step fails
/// is skipped with a warning; the rest of the batch proceeds. Returns the
/// subjects that were actually committed.
pub fn apply_proposed_commits(
    repo: &dyn Repo,
    commits: &[ProposedCommit],
) -> Vec<String> {
    let mut committed = Vec::new();
    for commit in commits {
        if commit.files.is_empty() {
            continue;
        }

        let subject = match validate_proposed(commit) {
            Ok(subject) => subject,
            Err(e) => {
                eprintln!("Skipping invalid commit \"{}\": {e}", commit.title);
                continue;
            }
        };

        let mut stage_targets = Vec::new();
        let mut skipped_missing = Vec::new();
        for f in &commit.files {
            if repo.workdir().join(f).exists() || repo.is_tracked(f) {
                // Existing file, or a tracked file whose deletion we stage.
                stage_targets.push(f.clone());
            } else {
                skipped_missing.push(f.clone());
            }
        }

        if !skipped_missing.is_empty() {
            eprintln!(
                "Skipping untracked missing files: {}",
                skipped_missing.join(", ")
            );
        }
        if stage_targets.is_empty() {
            eprintln!("No valid files to stage for commit '{subject}'; skipping.");
            continue;
        }

        if let Err(e) = repo.stage(&stage_targets) {
            eprintln!(
                "Staging failed for files: {}; skipping this commit.",
                stage_targets.join(", ")
            );
            eprintln!("{e}");
            continue;
        }

        match repo.commit(&subject, commit.body.as_deref()) {
            Ok(()) => committed.push(subject),
            Err(e) => {
                eprintln!("Commit failed; skipping remaining steps for this commit.");
                eprintln!("{e}");
            }
        }
    }
    committed
}

/// Rewrite the messages of existing commits, oldest first, keeping each
/// commit's tree. Returns the new tip sha, or `None` when there was
/// nothing to amend.
pub fn amend_commits(
    repo: &dyn Repo,
    amendments: &[Amendment],
    allow_dirty: bool,
) -> Result<Option<String>, RewriteError> {
    if !allow_dirty && !repo.is_working_tree_clean()? {
        return Err(RewriteError::DirtyTree);
    }
    if amendments.is_empty() {
        return Ok(None);
    }

    let base_parent = repo.parents_of(&amendments[0].sha)?.into_iter().next();

    let mut parent = base_parent;
    for entry in amendments {
        let tree = repo.tree_of(&entry.sha)?;
        let body = entry
            .body
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());
        let sha = repo.commit_tree(&tree, parent.as_deref(), entry.subject.trim(), body)?;
        parent = Some(sha);
    }
    match parent {
        Some(tip) => {
            repo.reset_hard(&tip)?;
            Ok(Some(tip))
        }
        None => Ok(None),
    }
}
