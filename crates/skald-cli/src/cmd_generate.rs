use skald_core::ProposedCommit;
use skald_git::Repo;
use skald_oracle::{OpenAiClient, Oracle};

pub(crate) struct PlannedChanges {
    pub diff: String,
    pub commits: Vec<ProposedCommit>,
}

/// Collect the requested change set and ask the oracle for a commit plan.
/// Neither `--staged` nor `--unstaged` means both. `None` when there is
/// nothing to plan over.
pub(crate) fn plan(
    repo: &dyn Repo,
    oracle: &dyn Oracle,
    staged: bool,
    unstaged: bool,
    untracked: bool,
) -> anyhow::Result<Option<PlannedChanges>> {
    let (staged, unstaged) = if !staged && !unstaged {
        (true, true)
    } else {
        (staged, unstaged)
    };

    let untracked_files = if untracked {
        repo.untracked_files()?
    } else {
        Vec::new()
    };
    let files = repo.changed_files(staged, unstaged, &untracked_files)?;
    if files.is_empty() {
        return Ok(None);
    }

    let diff = repo.diff(&files, staged, unstaged, &untracked_files)?;
    let commits = oracle.commit_plan(&files, &diff)?;
    Ok(Some(PlannedChanges { diff, commits }))
}

pub fn execute(repo: &dyn Repo, staged: bool, unstaged: bool, untracked: bool) -> anyhow::Result<()> {
    let oracle = OpenAiClient::from_env()?;
    match plan(repo, &oracle, staged, unstaged, untracked)? {
        None => {
            println!("No changed files found");
            Ok(())
        }
        Some(planned) => {
            println!("{}", serde_json::to_string_pretty(&planned.commits)?);
            Ok(())
        }
    }
}
