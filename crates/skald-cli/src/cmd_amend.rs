use std::collections::HashMap;

use skald_git::Repo;
use skald_history::amend_commits;
use skald_oracle::{OpenAiClient, Oracle};

pub fn execute(
    repo: &dyn Repo,
    max_count: usize,
    dry_run: bool,
    allow_dirty: bool,
) -> anyhow::Result<()> {
    let oracle = OpenAiClient::from_env()?;

    let (source_desc, commits) = repo.unpushed_commits(max_count)?;
    if commits.is_empty() {
        println!("No commits to amend.");
        return Ok(());
    }

    println!("Commits to consider ({source_desc}):");
    for c in &commits {
        println!("  - {} {}", short(&c.sha), c.subject);
    }

    let amendments = oracle.amendments(&commits)?;

    // Re-order to history order and require full coverage; a partial
    // rewrite would silently change only some messages.
    let mut by_sha: HashMap<&str, _> = amendments
        .iter()
        .map(|a| (a.sha.as_str(), a.clone()))
        .collect();
    let mut ordered = Vec::with_capacity(commits.len());
    for c in &commits {
        match by_sha.remove(c.sha.as_str()) {
            Some(a) => ordered.push(a),
            None => {
                eprintln!("No amendment returned for {}; aborting.", c.sha);
                return Ok(());
            }
        }
    }

    println!("\nProposed amendments:");
    for a in &ordered {
        println!("- {} -> {}", short(&a.sha), a.subject);
        if let Some(body) = a.body.as_deref() {
            let body = body.trim();
            if !body.is_empty() {
                println!("  body: {body}");
            }
        }
    }

    if dry_run {
        println!("\nDry run only; no changes applied.");
        return Ok(());
    }

    // Refuse to rewrite merge history.
    let range = match repo.upstream_ref() {
        Some(upstream) => format!("{upstream}..HEAD"),
        None => {
            let parents = repo.parents_of(&ordered[0].sha)?;
            let base = parents.first().map(String::as_str).unwrap_or("");
            let tip = &ordered[ordered.len() - 1].sha;
            format!("{base}..{tip}")
        }
    };
    if repo.range_has_merges(&range)? {
        eprintln!("History contains merges; linear rewrite only. Aborting.");
        return Ok(());
    }

    match amend_commits(repo, &ordered, allow_dirty) {
        Ok(_) => {
            println!("Amendments applied. History rewritten.");
            println!("Remember to push with --force-with-lease to update remote history.");
        }
        Err(e) => eprintln!("Amend failed: {e}"),
    }
    Ok(())
}

fn short(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}
