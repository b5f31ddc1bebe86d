//! Debounce/coalesce state machine for filesystem-triggered commits.
//!
//! One scheduler owns one window of state behind a single mutex. Two
//! inputs drive it: `on_event` (a change notification) and a timer fire.
//! The apply job always executes outside the lock, so a slow oracle call
//! never blocks event delivery. The clock and timer are injected so the
//! whole machine is deterministic under test.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Time source. Production reads the monotonic clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One-shot callback timer. `schedule` must return without invoking the
/// callback; the scheduler may be holding its lock at the call site.
pub trait Timer: Send + Sync {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>);
}

/// Production timer: a detached thread that sleeps and fires once.
pub struct ThreadTimer;

impl Timer for ThreadTimer {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce() + Send>) {
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            callback();
        });
    }
}

type Job = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

#[derive(Default)]
struct Window {
    /// A change arrived that no completed run has covered yet.
    pending: bool,
    /// The apply job is currently executing.
    processing: bool,
    /// A live timer will call back; never arm a second one.
    timer_armed: bool,
    last_run: Option<Instant>,
    next_run: Option<Instant>,
}

struct Inner {
    interval: Duration,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    job: Job,
    stop: AtomicBool,
    window: Mutex<Window>,
}

/// Coalesces change events into at most one apply run per interval
/// window. Cloning shares the same window.
#[derive(Clone)]
pub struct ChangeScheduler {
    inner: Arc<Inner>,
}

impl ChangeScheduler {
    pub fn new(
        interval: Duration,
        clock: Arc<dyn Clock>,
        timer: Arc<dyn Timer>,
        job: Job,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                interval,
                clock,
                timer,
                job,
                stop: AtomicBool::new(false),
                window: Mutex::new(Window::default()),
            }),
        }
    }

    pub fn with_system_timing(interval: Duration, job: Job) -> Self {
        Self::new(interval, Arc::new(SystemClock), Arc::new(ThreadTimer), job)
    }

    /// Record a change event. With a positive interval, returns the delay
    /// until the scheduled run; with interval zero the job runs here,
    /// synchronously, and `None` is returned. Repeated events inside one
    /// window never push the deadline forward.
    pub fn on_event(&self) -> Option<Duration> {
        let inner = &self.inner;
        if inner.stop.load(Ordering::SeqCst) {
            return None;
        }

        {
            let mut w = inner.window.lock().unwrap();
            w.pending = true;
            if !inner.interval.is_zero() {
                let now = inner.clock.now();
                if w.next_run.is_none() {
                    w.next_run = Some(next_window(w.last_run, now, inner.interval));
                }
                let delay = w
                    .next_run
                    .map(|next| next.saturating_duration_since(now))
                    .unwrap_or_default();
                Inner::schedule_locked(inner, &mut w, delay);
                return Some(delay);
            }

            if w.processing {
                // Coalesced; the completion path will reschedule.
                return None;
            }
        }

        // Interval zero: process immediately and synchronously.
        Inner::process_pending(inner, true);
        None
    }

    /// Cooperative stop: no new timer is armed after this, and an
    /// already-armed timer observes the flag before running the job.
    pub fn request_stop(&self) {
        self.inner.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stop.load(Ordering::SeqCst)
    }
}

impl Inner {
    /// Arm the timer if none is live. Must be called with the window lock
    /// held.
    fn schedule_locked(this: &Arc<Inner>, w: &mut Window, delay: Duration) {
        if this.stop.load(Ordering::SeqCst) {
            return;
        }
        if w.timer_armed {
            return;
        }
        w.timer_armed = true;
        debug!(target: "skald::watch", ?delay, "arming timer");
        let inner = Arc::clone(this);
        this.timer
            .schedule(delay, Box::new(move || Inner::process_pending(&inner, false)));
    }

    /// Claim a processing slot (or reschedule if the window has not
    /// elapsed), run the job outside the lock, then hand off a follow-up
    /// window if more changes arrived meanwhile.
    fn process_pending(this: &Arc<Inner>, direct: bool) {
        {
            let mut w = this.window.lock().unwrap();
            if !direct {
                w.timer_armed = false;
            }
            if this.stop.load(Ordering::SeqCst) {
                return;
            }
            if w.processing || !w.pending {
                return;
            }

            let now = this.clock.now();
            if !this.interval.is_zero() {
                if w.next_run.is_none() {
                    w.next_run = Some(next_window(w.last_run, now, this.interval));
                }
                if let Some(next) = w.next_run {
                    if now < next {
                        // Fired early; wait out the remainder.
                        Inner::schedule_locked(this, &mut w, next - now);
                        return;
                    }
                }
            }

            w.processing = true;
            w.pending = false;
            w.last_run = Some(now);
            w.next_run = None;
        }

        if let Err(e) = (this.job)() {
            warn!(target: "skald::watch", error = %e, "apply routine failed");
        }

        let mut w = this.window.lock().unwrap();
        w.processing = false;
        if this.stop.load(Ordering::SeqCst) {
            return;
        }
        if w.pending {
            // Changes arrived during the run; open the next window.
            let delay = if this.interval.is_zero() {
                Duration::ZERO
            } else {
                let now = this.clock.now();
                let next = next_window(w.last_run, now, this.interval);
                w.next_run = Some(next);
                next.saturating_duration_since(now)
            };
            Inner::schedule_locked(this, &mut w, delay);
        }
    }
}

fn next_window(last_run: Option<Instant>, now: Instant, interval: Duration) -> Instant {
    match last_run {
        Some(last) => last + interval,
        None => now + interval,
    }
}
