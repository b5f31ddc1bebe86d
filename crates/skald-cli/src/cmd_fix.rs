use skald_git::Repo;
use skald_history::apply_rewrite_plan;
use skald_oracle::{OpenAiClient, Oracle};

pub fn execute(repo: &dyn Repo, force: bool, max_count: usize) -> anyhow::Result<()> {
    let oracle = OpenAiClient::from_env()?;

    let (_, commits) = repo.commits_with_diffs(max_count, force)?;
    if commits.is_empty() {
        println!("No commits to process.");
        return Ok(());
    }

    let upstream = repo.upstream_ref();
    if !force && upstream.is_none() {
        eprintln!(
            "No upstream detected; using {} commit(s) from local history.",
            commits.len()
        );
    }
    if force && upstream.is_some() {
        eprintln!("Force enabled; including pushed commits from local history.");
    }

    let plan = match oracle.fix_plan(&commits) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Failed to get rewrite plan: {e}");
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&plan)?);

    match apply_rewrite_plan(repo, &commits, &plan) {
        Ok(outcome) => {
            println!("History updated ({}).", outcome.as_str());
            println!(
                "Remember to push with --force-with-lease if you had pushed these commits previously."
            );
        }
        Err(e) => eprintln!("Failed to apply rewrite plan: {e}"),
    }
    Ok(())
}
