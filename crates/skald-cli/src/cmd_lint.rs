use skald_core::validate_subject;
use skald_git::Repo;

pub fn execute(repo: &dyn Repo, count: usize) -> anyhow::Result<()> {
    let (source_desc, subjects) = repo.subjects_since_push(count)?;

    println!("Commits inspected: {source_desc}");
    if subjects.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for subj in &subjects {
        println!("  - {subj}");
    }

    let errors: Vec<String> = subjects
        .iter()
        .filter_map(|subj| validate_subject(subj).err().map(|e| format!("{subj}: {e}")))
        .collect();

    if errors.is_empty() {
        println!("Last {} commits pass lint", subjects.len());
    } else {
        println!("\nErrors:");
        for err in &errors {
            println!("  - {err}");
        }
    }
    Ok(())
}
