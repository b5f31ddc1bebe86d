use std::time::{Duration, Instant};

/// Console status line for the watch loop. Repeating the same message
/// inside the cooldown window is suppressed so a storm of identical
/// events does not scroll the terminal.
pub struct StatusLine {
    cooldown: Duration,
    last_message: Option<String>,
    last_shown: Option<Instant>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::with_cooldown(Duration::from_secs(5))
    }

    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_message: None,
            last_shown: None,
        }
    }

    /// Print `message` unless it repeats within the cooldown. Returns
    /// whether anything was printed.
    pub fn show(&mut self, message: &str) -> bool {
        if self.should_show(Instant::now(), message) {
            println!("{message}");
            true
        } else {
            false
        }
    }

    fn should_show(&mut self, now: Instant, message: &str) -> bool {
        let repeated = self.last_message.as_deref() == Some(message);
        let inside_cooldown = self
            .last_shown
            .map(|t| now.duration_since(t) < self.cooldown)
            .unwrap_or(false);
        if repeated && inside_cooldown {
            return false;
        }
        self.last_message = Some(message.to_string());
        self.last_shown = Some(now);
        true
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_message_is_suppressed_inside_cooldown() {
        let mut line = StatusLine::with_cooldown(Duration::from_secs(5));
        let t0 = Instant::now();
        assert!(line.should_show(t0, "No changes found yet..."));
        assert!(!line.should_show(t0 + Duration::from_secs(2), "No changes found yet..."));
        assert!(line.should_show(t0 + Duration::from_secs(6), "No changes found yet..."));
    }

    #[test]
    fn different_message_always_shows() {
        let mut line = StatusLine::with_cooldown(Duration::from_secs(5));
        let t0 = Instant::now();
        assert!(line.should_show(t0, "Checking for changes..."));
        assert!(line.should_show(t0 + Duration::from_secs(1), "No changes found yet..."));
        // Switching back also resets the window for the first message.
        assert!(line.should_show(t0 + Duration::from_secs(2), "Checking for changes..."));
    }
}
