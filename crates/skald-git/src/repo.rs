//! The [`Repo`] trait and its production implementation over the `git`
//! binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use skald_core::{CommitMeta, CommitRecord};
use tracing::debug;

use crate::error::GitError;

/// Field and record separators used in `git log --format` output so
/// subjects and bodies with newlines survive parsing.
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Read/write repository primitives. One production implementation spawns
/// the `git` binary; tests may substitute their own.
pub trait Repo {
    /// Root of the working tree all relative paths resolve against.
    fn workdir(&self) -> &Path;

    /// The configured upstream ref (e.g. `origin/main`), or `None` when no
    /// tracking branch exists. Never an error for that specific absence.
    fn upstream_ref(&self) -> Option<String>;

    fn current_branch(&self) -> Result<String, GitError>;

    /// True when `git status --porcelain` reports nothing.
    fn is_working_tree_clean(&self) -> Result<bool, GitError>;

    fn is_tracked(&self, path: &str) -> bool;

    /// True for paths git ignores, including anything under `.git/`.
    fn is_ignored(&self, path: &Path) -> bool;

    /// Untracked files, excluding ignored ones.
    fn untracked_files(&self) -> Result<Vec<String>, GitError>;

    /// Ordered union of changed files: staged first, then unstaged, then
    /// the given untracked files, without duplicates.
    fn changed_files(
        &self,
        staged: bool,
        unstaged: bool,
        untracked: &[String],
    ) -> Result<Vec<String>, GitError>;

    /// Combined diff text for the given files: staged and/or unstaged
    /// sections plus a `--no-index` diff against /dev/null for each
    /// untracked file.
    fn diff(
        &self,
        files: &[String],
        staged: bool,
        unstaged: bool,
        untracked: &[String],
    ) -> Result<String, GitError>;

    /// Stage the given paths with `git add -A -- <paths>` so deletions are
    /// staged too.
    fn stage(&self, paths: &[String]) -> Result<(), GitError>;

    /// Stage everything (`git add -A`).
    fn stage_all(&self) -> Result<(), GitError>;

    /// Create a commit from the index.
    fn commit(&self, subject: &str, body: Option<&str>) -> Result<(), GitError>;

    /// Commit subjects since the last push (newest first), falling back to
    /// the last `fallback_count` commits when no upstream is configured.
    /// Returns a human-readable source description alongside the subjects.
    fn subjects_since_push(&self, fallback_count: usize)
        -> Result<(String, Vec<String>), GitError>;

    /// Unpushed commits oldest-first, first-parent lineage only.
    fn unpushed_commits(&self, max_count: usize)
        -> Result<(String, Vec<CommitMeta>), GitError>;

    /// Unpushed commits (or, with `force`, the last `max_count` commits)
    /// with their full diffs, oldest-first. Commits whose diff cannot be
    /// read are skipped with a warning.
    fn commits_with_diffs(
        &self,
        max_count: usize,
        force: bool,
    ) -> Result<(String, Vec<CommitRecord>), GitError>;

    /// Parent shas of a commit, in order.
    fn parents_of(&self, sha: &str) -> Result<Vec<String>, GitError>;

    /// Tree sha of a revision.
    fn tree_of(&self, rev: &str) -> Result<String, GitError>;

    /// Whether the range (e.g. `base..tip`) contains any merge commit on
    /// the first-parent lineage.
    fn range_has_merges(&self, range: &str) -> Result<bool, GitError>;

    /// Create a detached commit object from a tree and optional parent.
    /// Pure object creation; no ref moves.
    fn commit_tree(
        &self,
        tree: &str,
        parent: Option<&str>,
        title: &str,
        body: Option<&str>,
    ) -> Result<String, GitError>;

    /// Move the current branch and working tree to `rev`. Destructive.
    fn reset_hard(&self, rev: &str) -> Result<(), GitError>;
}

/// Production [`Repo`] spawning the `git` binary in a fixed directory.
pub struct SystemGit {
    dir: PathBuf,
}

impl SystemGit {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Run `git <args>` and return trimmed stdout. Non-zero exit becomes
    /// `GitError::CommandFailed` carrying stdout and stderr.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        debug!(target: "skald::git", cmd = %args.join(" "), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()?;
        if !output.status.success() {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Like `run`, but treats exit code 1 as success. `git diff --no-index`
    /// uses the exit code to signal "files differ".
    fn run_allow_exit_one(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()?;
        if !output.status.success() && output.status.code() != Some(1) {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Exit status of `git <args>`, with all output discarded.
    fn status_ok(&self, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn log_records(&self, log_args: &[&str]) -> Result<Vec<(String, String, String)>, GitError> {
        let raw = self.run(log_args)?;
        let mut records = Vec::new();
        for record in raw.split(RECORD_SEP) {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }
            let mut parts = record.split(FIELD_SEP);
            let (Some(sha), Some(subject)) = (parts.next(), parts.next()) else {
                eprintln!("Skipping malformed commit record: {record}");
                continue;
            };
            let body = parts.next().unwrap_or("");
            records.push((
                sha.trim().to_string(),
                subject.trim().to_string(),
                body.trim().to_string(),
            ));
        }
        Ok(records)
    }
}

fn command_failed(args: &[&str], output: &std::process::Output) -> GitError {
    let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr.trim());
    }
    GitError::CommandFailed {
        cmd: args.join(" "),
        output: combined.trim().to_string(),
    }
}

impl Repo for SystemGit {
    fn workdir(&self) -> &Path {
        &self.dir
    }

    fn upstream_ref(&self) -> Option<String> {
        self.run(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
            .ok()
            .filter(|s| !s.is_empty())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn is_working_tree_clean(&self) -> Result<bool, GitError> {
        Ok(self.run(&["status", "--porcelain"])?.trim().is_empty())
    }

    fn is_tracked(&self, path: &str) -> bool {
        self.status_ok(&["ls-files", "--error-unmatch", path])
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.dir).unwrap_or(path);
        let rel_str = rel.to_string_lossy();
        if rel_str.starts_with(".git") {
            return true;
        }
        self.status_ok(&["check-ignore", "-q", rel_str.as_ref()])
    }

    fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        let out = self.run(&["ls-files", "--others", "--exclude-standard"])?;
        Ok(out
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn changed_files(
        &self,
        staged: bool,
        unstaged: bool,
        untracked: &[String],
    ) -> Result<Vec<String>, GitError> {
        let mut files: Vec<String> = Vec::new();
        if staged {
            let out = self.run(&["diff", "--cached", "--name-only"])?;
            files.extend(out.lines().filter(|l| !l.is_empty()).map(str::to_string));
        }
        if unstaged {
            let out = self.run(&["diff", "--name-only"])?;
            for f in out.lines().filter(|l| !l.is_empty()) {
                if !files.iter().any(|x| x == f) {
                    files.push(f.to_string());
                }
            }
        }
        for f in untracked {
            if !f.is_empty() && !files.iter().any(|x| x == f) {
                files.push(f.clone());
            }
        }
        Ok(files)
    }

    fn diff(
        &self,
        files: &[String],
        staged: bool,
        unstaged: bool,
        untracked: &[String],
    ) -> Result<String, GitError> {
        let mut parts = Vec::new();
        if staged && !files.is_empty() {
            let mut args = vec!["diff", "--cached", "--"];
            args.extend(files.iter().map(String::as_str));
            parts.push(self.run(&args)?);
        }
        if unstaged && !files.is_empty() {
            let mut args = vec!["diff", "--"];
            args.extend(files.iter().map(String::as_str));
            parts.push(self.run(&args)?);
        }
        for f in untracked {
            parts.push(self.run_allow_exit_one(&["diff", "--no-index", "--", "/dev/null", f])?);
        }
        Ok(parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn stage(&self, paths: &[String]) -> Result<(), GitError> {
        let mut args = vec!["add", "-A", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args)?;
        Ok(())
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.run(&["add", "-A"])?;
        Ok(())
    }

    fn commit(&self, subject: &str, body: Option<&str>) -> Result<(), GitError> {
        let mut args = vec!["commit", "-m", subject];
        if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
            args.push("-m");
            args.push(body);
        }
        self.run(&args)?;
        Ok(())
    }

    fn subjects_since_push(
        &self,
        fallback_count: usize,
    ) -> Result<(String, Vec<String>), GitError> {
        let (desc, out) = match self.upstream_ref() {
            Some(upstream) => {
                let range = format!("{upstream}..HEAD");
                let desc = format!("commits since last push ({range})");
                (desc, self.run(&["log", &range, "--pretty=format:%s"])?)
            }
            None => {
                let count = format!("-{fallback_count}");
                let desc = format!("last {fallback_count} commits (no upstream found)");
                (desc, self.run(&["log", &count, "--pretty=format:%s"])?)
            }
        };
        let subjects = out
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        Ok((desc, subjects))
    }

    fn unpushed_commits(
        &self,
        max_count: usize,
    ) -> Result<(String, Vec<CommitMeta>), GitError> {
        let format = format!("--format=%H{FIELD_SEP}%s{FIELD_SEP}%b{RECORD_SEP}");
        let (desc, records) = match self.upstream_ref() {
            Some(upstream) => {
                let range = format!("{upstream}..HEAD");
                let desc = format!("unpushed commits ({range})");
                let records =
                    self.log_records(&["log", "--reverse", "--first-parent", &format, &range])?;
                (desc, records)
            }
            None => {
                let desc = format!("last {max_count} commits (no upstream found)");
                let n = max_count.to_string();
                let records = self.log_records(&[
                    "log",
                    "--reverse",
                    "--first-parent",
                    "-n",
                    &n,
                    &format,
                    "HEAD",
                ])?;
                (desc, records)
            }
        };
        let commits = records
            .into_iter()
            .map(|(sha, subject, body)| CommitMeta { sha, subject, body })
            .collect();
        Ok((desc, commits))
    }

    fn commits_with_diffs(
        &self,
        max_count: usize,
        force: bool,
    ) -> Result<(String, Vec<CommitRecord>), GitError> {
        let format = format!("--format=%H{FIELD_SEP}%s{FIELD_SEP}%b{RECORD_SEP}");
        let upstream = self.upstream_ref();
        let (desc, records) = match upstream {
            Some(ref upstream) if !force => {
                let range = format!("{upstream}..HEAD");
                let desc = format!("unpushed commits ({range})");
                let records =
                    self.log_records(&["log", "--reverse", "--first-parent", &format, &range])?;
                (desc, records)
            }
            _ => {
                let mut desc = format!("last {max_count} commits");
                if force && upstream.is_some() {
                    desc.push_str(" (force enabled)");
                } else if upstream.is_none() {
                    desc.push_str(" (no upstream found)");
                }
                let n = max_count.to_string();
                let records = self.log_records(&[
                    "log",
                    "--reverse",
                    "--first-parent",
                    "-n",
                    &n,
                    &format,
                    "HEAD",
                ])?;
                (desc, records)
            }
        };

        let mut commits = Vec::new();
        for (sha, subject, body) in records {
            let message = if body.is_empty() {
                subject
            } else {
                format!("{subject}\n\n{body}")
            };
            let diff = match self.run(&["show", &sha, "--format=format:"]) {
                Ok(diff) => diff,
                Err(e) => {
                    eprintln!("Skipping commit {sha}: git show failed");
                    eprintln!("{e}");
                    continue;
                }
            };
            commits.push(CommitRecord {
                hash: sha,
                message,
                diff,
            });
        }
        Ok((desc, commits))
    }

    fn parents_of(&self, sha: &str) -> Result<Vec<String>, GitError> {
        let out = self.run(&["show", "-s", "--format=%P", sha])?;
        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    fn tree_of(&self, rev: &str) -> Result<String, GitError> {
        self.run(&["show", "-s", "--format=%T", rev])
    }

    fn range_has_merges(&self, range: &str) -> Result<bool, GitError> {
        let out = self.run(&["rev-list", "--merges", "--first-parent", range])?;
        Ok(!out.trim().is_empty())
    }

    fn commit_tree(
        &self,
        tree: &str,
        parent: Option<&str>,
        title: &str,
        body: Option<&str>,
    ) -> Result<String, GitError> {
        let mut args = vec!["commit-tree", tree];
        if let Some(parent) = parent {
            args.push("-p");
            args.push(parent);
        }
        let title = title.trim();
        args.push("-m");
        args.push(title);
        if let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) {
            args.push("-m");
            args.push(body);
        }
        self.run(&args)
    }

    fn reset_hard(&self, rev: &str) -> Result<(), GitError> {
        self.run(&["reset", "--hard", rev])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn git(dir: &Path, args: &[&str]) {
        let out = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git runs");
        assert!(
            out.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    fn init_repo(dir: &Path) -> SystemGit {
        git(dir, &["init", "-q", "-b", "main"]);
        git(dir, &["config", "user.email", "test@test.com"]);
        git(dir, &["config", "user.name", "Test"]);
        SystemGit::new(dir)
    }

    fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
        fs::write(dir.join(name), content).unwrap();
        git(dir, &["add", name]);
        git(dir, &["commit", "-q", "-m", message]);
    }

    #[test]
    fn no_upstream_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "a", "feat: a");
        assert_eq!(repo.upstream_ref(), None);
    }

    #[test]
    fn clean_and_dirty_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "a", "feat: a");
        assert!(repo.is_working_tree_clean().unwrap());

        fs::write(tmp.path().join("a.txt"), "changed").unwrap();
        assert!(!repo.is_working_tree_clean().unwrap());
    }

    #[test]
    fn changed_files_and_diff_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "one\n", "feat: a");

        fs::write(tmp.path().join("a.txt"), "two\n").unwrap();
        git(tmp.path(), &["add", "a.txt"]);
        fs::write(tmp.path().join("b.txt"), "new\n").unwrap();

        let untracked = repo.untracked_files().unwrap();
        assert_eq!(untracked, vec!["b.txt".to_string()]);

        let files = repo.changed_files(true, true, &untracked).unwrap();
        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);

        let diff = repo.diff(&files, true, true, &untracked).unwrap();
        assert!(diff.contains("-one"));
        assert!(diff.contains("+two"));
        // Untracked file appears via the --no-index section.
        assert!(diff.contains("+new"));
    }

    #[test]
    fn tracked_and_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        fs::write(tmp.path().join(".gitignore"), "target/\n").unwrap();
        git(tmp.path(), &["add", ".gitignore"]);
        git(tmp.path(), &["commit", "-q", "-m", "chore: ignore"]);

        assert!(repo.is_tracked(".gitignore"));
        assert!(!repo.is_tracked("missing.txt"));
        assert!(repo.is_ignored(&tmp.path().join("target/debug/x")));
        assert!(repo.is_ignored(&tmp.path().join(".git/config")));
        assert!(!repo.is_ignored(&tmp.path().join("src.rs")));
    }

    #[test]
    fn unpushed_commits_fall_back_without_upstream() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "a", "feat: first");
        fs::write(tmp.path().join("a.txt"), "b").unwrap();
        git(tmp.path(), &["add", "a.txt"]);
        git(tmp.path(), &["commit", "-q", "-m", "fix: second", "-m", "body text"]);

        let (desc, commits) = repo.unpushed_commits(20).unwrap();
        assert!(desc.contains("no upstream found"));
        assert_eq!(commits.len(), 2);
        // Oldest first.
        assert_eq!(commits[0].subject, "feat: first");
        assert_eq!(commits[1].subject, "fix: second");
        assert_eq!(commits[1].body, "body text");
    }

    #[test]
    fn commits_with_diffs_include_patch_text() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "hello\n", "feat: greet");

        let (_, commits) = repo.commits_with_diffs(10, false).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "feat: greet");
        assert!(commits[0].diff.contains("+hello"));
    }

    #[test]
    fn commit_tree_and_reset_rewrite_head() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "a", "feat: a");
        commit_file(tmp.path(), "b.txt", "b", "feat: b");

        let (_, commits) = repo.unpushed_commits(10).unwrap();
        let old_tip_tree = repo.tree_of(&commits[1].sha).unwrap();
        let base = repo.parents_of(&commits[0].sha).unwrap();
        assert!(base.is_empty(), "root commit has no parent");
        let parents_of_tip = repo.parents_of(&commits[1].sha).unwrap();
        assert_eq!(parents_of_tip, vec![commits[0].sha.clone()]);

        let new_sha = repo
            .commit_tree(&old_tip_tree, Some(&commits[0].sha), "feat: replaced", Some("why"))
            .unwrap();
        repo.reset_hard(&new_sha).unwrap();

        let (_, subjects) = repo.subjects_since_push(10).unwrap();
        assert_eq!(subjects[0], "feat: replaced");
        assert_eq!(repo.tree_of("HEAD").unwrap(), old_tip_tree);
    }

    #[test]
    fn range_has_merges_detects_merge() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(tmp.path(), "a.txt", "a", "feat: a");
        let base = repo.run(&["rev-parse", "HEAD"]).unwrap();

        git(tmp.path(), &["checkout", "-q", "-b", "side"]);
        commit_file(tmp.path(), "side.txt", "s", "feat: side");
        git(tmp.path(), &["checkout", "-q", "main"]);
        commit_file(tmp.path(), "main.txt", "m", "feat: main");
        git(tmp.path(), &["merge", "-q", "--no-ff", "-m", "merge side", "side"]);

        assert!(repo.range_has_merges(&format!("{base}..HEAD")).unwrap());
        assert!(!repo.range_has_merges(&format!("{base}..{base}")).unwrap());
    }

    #[test]
    fn command_failure_carries_output() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = init_repo(tmp.path());
        let err = repo.tree_of("no-such-rev").unwrap_err();
        match err {
            GitError::CommandFailed { cmd, output } => {
                assert!(cmd.contains("show"));
                assert!(!output.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
