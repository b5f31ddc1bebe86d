use std::sync::Mutex;
use std::time::Duration;

use skald_git::{Repo, SystemGit};
use skald_oracle::OpenAiClient;
use skald_watch::{job, ChangeScheduler, StatusLine, WatchSession};

use crate::ui;

pub fn execute(repo: &dyn Repo, interval: u64) -> anyhow::Result<()> {
    let oracle = OpenAiClient::from_env()?;
    let interval = Duration::from_secs(interval.max(1));

    ui::display_spinning_animation("Watching for changes... (Ctrl+C to stop)");

    let job_repo = SystemGit::new(repo.workdir());
    let status = Mutex::new(StatusLine::new());
    let scheduler = ChangeScheduler::with_system_timing(
        interval,
        Box::new(move || {
            let mut status = status.lock().unwrap();
            job::run_auto_commit(&job_repo, &oracle, &mut status).map(|_| ())
        }),
    );

    let stopper = scheduler.clone();
    ctrlc::set_handler(move || {
        if !stopper.is_stopped() {
            println!("\nStopping watch...");
            stopper.request_stop();
        }
    })?;

    let session = WatchSession::start(repo.workdir(), scheduler)?;
    session.run(repo);

    println!("Watch stopped");
    Ok(())
}
