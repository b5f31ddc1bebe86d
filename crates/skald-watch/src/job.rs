use skald_git::Repo;
use skald_history::apply_proposed_commits;
use skald_oracle::Oracle;

use crate::status::StatusLine;

/// One pass of the watch loop's apply routine: stage everything, ask the
/// oracle for a commit plan over the staged diff, and commit it. Returns
/// the subjects committed; an empty vec means there was nothing to do.
pub fn run_auto_commit(
    repo: &dyn Repo,
    oracle: &dyn Oracle,
    status: &mut StatusLine,
) -> anyhow::Result<Vec<String>> {
    status.show("Checking for changes...");

    repo.stage_all()?;
    let files = repo.changed_files(true, false, &[])?;
    if files.is_empty() {
        status.show("No changes found yet...");
        return Ok(Vec::new());
    }

    let diff = repo.diff(&files, true, false, &[])?;
    let commits = oracle.commit_plan(&files, &diff)?;
    let committed = apply_proposed_commits(repo, &commits);
    for subject in &committed {
        println!("Committed: {subject}");
    }
    Ok(committed)
}
