use std::io::Write;
use std::time::Duration;

use skald_core::ProposedCommit;
use skald_git::Repo;

const SPINNER_FRAMES: &[char] = &['|', '/', '-', '\\'];
const SPIN_CYCLES: usize = 24;

/// Brief spinner shown when the watch loop starts.
pub fn display_spinning_animation(message: &str) {
    let mut out = std::io::stdout();
    for i in 0..SPIN_CYCLES {
        let frame = SPINNER_FRAMES[i % SPINNER_FRAMES.len()];
        print!("\r{message} {frame}");
        let _ = out.flush();
        std::thread::sleep(Duration::from_millis(50));
    }
    println!("\r{message}    ");
}

/// Numbered preview of a proposed commit plan.
pub fn format_commit_preview(commits: &[ProposedCommit]) -> String {
    let mut lines = Vec::new();
    for (idx, c) in commits.iter().enumerate() {
        lines.push(format!("{}. {}: {}", idx + 1, c.commit_type, c.title.trim()));
        if let Some(body) = c.body.as_deref() {
            let body = body.trim();
            if !body.is_empty() {
                lines.push(format!("   body: {body}"));
            }
        }
        if !c.files.is_empty() {
            lines.push(format!("   files: {}", c.files.join(", ")));
        }
    }
    lines.join("\n")
}

/// Newest-first commit log since the last push, so a just-created commit
/// sits on top.
pub fn print_commit_log(repo: &dyn Repo, fallback_count: usize) -> anyhow::Result<()> {
    let (source_desc, subjects) = repo.subjects_since_push(fallback_count)?;
    let divider = "─".repeat(48);
    println!("{divider}");
    println!(" Commit log (newest first) ");
    println!("Source: {source_desc}");
    if subjects.is_empty() {
        println!("  (none)");
    } else {
        let pad = subjects.len().to_string().len();
        for (idx, subj) in subjects.iter().enumerate() {
            println!("  {:>pad$}. {subj}", idx + 1);
        }
    }
    println!("{divider}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_numbers_and_indents() {
        let commits = vec![
            ProposedCommit {
                commit_type: "feat".into(),
                title: "add login".into(),
                body: Some("OAuth flow".into()),
                files: vec!["src/auth.rs".into()],
            },
            ProposedCommit {
                commit_type: "docs".into(),
                title: "update readme".into(),
                body: None,
                files: vec!["README.md".into()],
            },
        ];
        let preview = format_commit_preview(&commits);
        let expected = "1. feat: add login\n   body: OAuth flow\n   files: src/auth.rs\n2. docs: update readme\n   files: README.md";
        assert_eq!(preview, expected);
    }

    #[test]
    fn preview_of_empty_plan_is_empty() {
        assert_eq!(format_commit_preview(&[]), "");
    }
}
