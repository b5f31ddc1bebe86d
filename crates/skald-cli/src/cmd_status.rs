use skald_git::Repo;

pub fn execute(repo: &dyn Repo) -> anyhow::Result<()> {
    let staged = repo.changed_files(true, false, &[])?;
    let unstaged = repo.changed_files(false, true, &[])?;

    println!("Staged:");
    print_files(&staged);
    println!("\nUnstaged:");
    print_files(&unstaged);
    Ok(())
}

fn print_files(files: &[String]) {
    if files.is_empty() {
        println!("(none)");
    } else {
        for f in files {
            println!("{f}");
        }
    }
}
