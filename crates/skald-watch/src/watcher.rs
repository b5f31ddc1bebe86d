use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use skald_git::Repo;
use tracing::warn;

use crate::scheduler::ChangeScheduler;
use crate::status::StatusLine;

/// Recursive filesystem watch over a repository working tree, feeding
/// change events into a [`ChangeScheduler`]. Events under `.git/` and for
/// git-ignored paths are dropped before they reach the scheduler.
pub struct WatchSession {
    scheduler: ChangeScheduler,
    // Kept alive for the session; dropping it stops event delivery.
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<notify::Event>>,
}

impl WatchSession {
    /// Start watching `root` recursively.
    pub fn start(root: &Path, scheduler: ChangeScheduler) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            scheduler,
            _watcher: watcher,
            rx,
        })
    }

    pub fn scheduler(&self) -> &ChangeScheduler {
        &self.scheduler
    }

    /// Pump events until the scheduler is stopped. The short receive
    /// timeout keeps stop requests prompt.
    pub fn run(&self, repo: &dyn Repo) {
        let mut status = StatusLine::new();
        while !self.scheduler.is_stopped() {
            match self.rx.recv_timeout(Duration::from_millis(200)) {
                Ok(Ok(event)) => self.handle_event(repo, &event, &mut status),
                Ok(Err(e)) => warn!(target: "skald::watch", error = %e, "watch backend error"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn handle_event(&self, repo: &dyn Repo, event: &notify::Event, status: &mut StatusLine) {
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        for path in &event.paths {
            if repo.is_ignored(path) {
                continue;
            }
            // One scheduler notification per event is enough; the window
            // coalesces the rest.
            if let Some(delay) = self.scheduler.on_event() {
                status.show(&format!(
                    "Change detected; next check in {}s...",
                    delay.as_secs()
                ));
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use skald_git::SystemGit;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn file_write_triggers_scheduler_job() {
        let tmp = tempfile::tempdir().unwrap();
        git(tmp.path(), &["init", "-q", "-b", "main"]);

        let runs = Arc::new(AtomicUsize::new(0));
        let runs2 = Arc::clone(&runs);
        let scheduler = ChangeScheduler::with_system_timing(
            Duration::ZERO,
            Box::new(move || {
                runs2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        let stopper = scheduler.clone();
        let session = WatchSession::start(tmp.path(), scheduler).unwrap();

        let root = tmp.path().to_path_buf();
        let pump = thread::spawn(move || {
            let repo = SystemGit::new(&root);
            session.run(&repo);
        });

        // Give the backend a moment to establish the watch, then change a
        // file and wait for the job to run.
        thread::sleep(Duration::from_millis(300));
        fs::write(tmp.path().join("watched.txt"), "hello\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while runs.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
        }
        stopper.request_stop();
        pump.join().unwrap();

        assert!(runs.load(Ordering::SeqCst) >= 1, "job never ran");
    }

    #[test]
    fn git_internal_events_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        git(tmp.path(), &["init", "-q", "-b", "main"]);

        let runs = Arc::new(AtomicUsize::new(0));
        let runs2 = Arc::clone(&runs);
        let scheduler = ChangeScheduler::with_system_timing(
            Duration::ZERO,
            Box::new(move || {
                runs2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        let stopper = scheduler.clone();
        let session = WatchSession::start(tmp.path(), scheduler).unwrap();

        let root = tmp.path().to_path_buf();
        let pump = thread::spawn(move || {
            let repo = SystemGit::new(&root);
            session.run(&repo);
        });

        thread::sleep(Duration::from_millis(300));
        fs::write(tmp.path().join(".git").join("scratch"), "x").unwrap();
        thread::sleep(Duration::from_millis(700));

        stopper.request_stop();
        pump.join().unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
