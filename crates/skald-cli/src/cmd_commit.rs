use skald_git::Repo;
use skald_history::apply_proposed_commits;
use skald_oracle::OpenAiClient;

use crate::cmd_generate;
use crate::ui;

const LOG_FALLBACK_COUNT: usize = 10;

pub fn execute(
    repo: &dyn Repo,
    staged: bool,
    unstaged: bool,
    untracked: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let oracle = OpenAiClient::from_env()?;
    let Some(planned) = cmd_generate::plan(repo, &oracle, staged, unstaged, untracked)? else {
        println!("No changed files found");
        return Ok(());
    };

    println!("{}", serde_json::to_string_pretty(&planned.commits)?);

    if dry_run {
        println!("Dry run: planned commits");
        let preview = ui::format_commit_preview(&planned.commits);
        if !preview.is_empty() {
            println!("{preview}");
        }
        if !planned.diff.is_empty() {
            println!("\nDiff used for planning:");
            println!("{}", planned.diff);
        }
        return Ok(());
    }

    let committed = apply_proposed_commits(repo, &planned.commits);
    if !committed.is_empty() {
        println!("✔ Committed: {}", committed.join(", "));
        ui::print_commit_log(repo, LOG_FALLBACK_COUNT)?;
    }
    Ok(())
}
