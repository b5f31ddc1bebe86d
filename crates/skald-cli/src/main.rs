mod cmd_amend;
mod cmd_commit;
mod cmd_fix;
mod cmd_generate;
mod cmd_lint;
mod cmd_status;
mod cmd_watch;
mod ui;

use clap::{Parser, Subcommand};
use skald_git::SystemGit;

#[derive(Parser)]
#[command(name = "skald", version, about = "AI-powered git commit automation")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate commit messages without committing
    Generate {
        /// Include staged changes
        #[arg(long)]
        staged: bool,
        /// Include unstaged changes
        #[arg(long)]
        unstaged: bool,
        /// Include untracked files
        #[arg(long)]
        untracked: bool,
    },
    /// Generate and apply commits
    Commit {
        /// Include staged changes
        #[arg(long)]
        staged: bool,
        /// Include unstaged changes
        #[arg(long)]
        unstaged: bool,
        /// Include untracked files
        #[arg(long)]
        untracked: bool,
        /// Preview commits and diff without committing
        #[arg(long)]
        dry_run: bool,
    },
    /// Amend unpushed commit messages using AI suggestions
    #[command(name = "amend-unpushed", alias = "amend_unpushed")]
    AmendUnpushed {
        /// If no upstream, how many last commits to consider
        #[arg(long, default_value_t = 20)]
        max_count: usize,
        /// Preview amendments without rewriting
        #[arg(long)]
        dry_run: bool,
        /// Allow running with a dirty working tree
        #[arg(long)]
        allow_dirty: bool,
    },
    /// Ask AI for a rewritten commit plan and apply it
    Fix {
        /// Include pushed commits as well (limits to last N)
        #[arg(long)]
        force: bool,
        /// Maximum commits to include when no upstream or when forcing
        #[arg(long, default_value_t = 20)]
        max_count: usize,
    },
    /// Show staged and unstaged changes
    Status,
    /// Lint recent commit messages against Conventional Commits format
    Lint {
        /// How many commits to inspect when no upstream is configured
        #[arg(default_value_t = 10)]
        count: usize,
    },
    /// Watch for file changes and auto-commit
    Watch {
        /// Polling interval in seconds (default is 5 minutes)
        #[arg(long, default_value_t = 300)]
        interval: u64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let repo = SystemGit::from_current_dir()?;

    match cli.cmd {
        Command::Generate {
            staged,
            unstaged,
            untracked,
        } => cmd_generate::execute(&repo, staged, unstaged, untracked),
        Command::Commit {
            staged,
            unstaged,
            untracked,
            dry_run,
        } => cmd_commit::execute(&repo, staged, unstaged, untracked, dry_run),
        Command::AmendUnpushed {
            max_count,
            dry_run,
            allow_dirty,
        } => cmd_amend::execute(&repo, max_count, dry_run, allow_dirty),
        Command::Fix { force, max_count } => cmd_fix::execute(&repo, force, max_count),
        Command::Status => cmd_status::execute(&repo),
        Command::Lint { count } => cmd_lint::execute(&repo, count),
        Command::Watch { interval } => cmd_watch::execute(&repo, interval),
    }
}
