//! Timing primitives: draw coalescing and double-click arbitration.
//!
//! Both take explicit timestamps so they are deterministic under test and
//! independent of any UI framework.

use log::debug;
use std::time::{Duration, Instant};

/// Delay within which draw requests are coalesced into one render.
pub const DRAW_DELAY: Duration = Duration::from_millis(100);

/// Idle window separating a double-click from two isolated clicks.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(350);

/// Single-slot draw scheduler: every request bumps a version and re-arms the
/// delay; only the latest request renders when the delay expires, so render
/// cost is bounded to roughly one pass per delay regardless of how many
/// state-mutating events fire.
#[derive(Debug)]
pub struct DrawScheduler {
    delay: Duration,
    requests: u64,
    deadline: Option<Instant>,
}

impl DrawScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            requests: 0,
            deadline: None,
        }
    }

    pub fn request(&mut self, now: Instant) {
        self.requests += 1;
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once per burst, when the latest request's delay has
    /// expired.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                if self.requests > 1 {
                    debug!("number of draws skipped: {}", self.requests - 1);
                }
                self.requests = 0;
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Reports whether a click completes a double-click: the first click arms the
/// window, a second click inside it resolves.
#[derive(Debug)]
pub struct ClickArbiter {
    window: Duration,
    armed_at: Option<Instant>,
}

impl ClickArbiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    pub fn click(&mut self, now: Instant) -> bool {
        match self.armed_at {
            Some(at) if now.duration_since(at) <= self.window => {
                self.armed_at = None;
                true
            }
            _ => {
                self.armed_at = Some(now);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_renders_once() {
        let mut scheduler = DrawScheduler::new(Duration::from_millis(100));
        let t0 = Instant::now();
        for i in 0..5 {
            scheduler.request(t0 + Duration::from_millis(i * 10));
        }
        // before the last deadline nothing fires
        assert!(!scheduler.poll(t0 + Duration::from_millis(100)));
        // at the last deadline exactly one render fires
        assert!(scheduler.poll(t0 + Duration::from_millis(140)));
        assert!(!scheduler.poll(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_new_burst_fires_again() {
        let mut scheduler = DrawScheduler::new(Duration::from_millis(100));
        let t0 = Instant::now();
        scheduler.request(t0);
        assert!(scheduler.poll(t0 + Duration::from_millis(100)));
        scheduler.request(t0 + Duration::from_millis(200));
        assert!(scheduler.poll(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_double_click_window() {
        let mut clicks = ClickArbiter::new(Duration::from_millis(350));
        let t0 = Instant::now();
        assert!(!clicks.click(t0));
        assert!(clicks.click(t0 + Duration::from_millis(200)));
        // resolved; the next click starts a fresh window
        assert!(!clicks.click(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn test_slow_clicks_do_not_resolve() {
        let mut clicks = ClickArbiter::new(Duration::from_millis(350));
        let t0 = Instant::now();
        assert!(!clicks.click(t0));
        assert!(!clicks.click(t0 + Duration::from_millis(400)));
        // the late click re-armed the window
        assert!(clicks.click(t0 + Duration::from_millis(500)));
    }
}
