//! Debounced auto-commit on filesystem changes. [`ChangeScheduler`]
//! coalesces change notifications so at most one apply routine runs at a
//! time and no event is ever dropped; [`WatchSession`] feeds it from a
//! recursive filesystem watcher.

pub mod job;
pub mod scheduler;
pub mod status;
pub mod watcher;

pub use scheduler::{ChangeScheduler, Clock, SystemClock, ThreadTimer, Timer};
pub use status::StatusLine;
pub use watcher::WatchSession;
