// ABOUTME: Deadline-based timers polled from the UI loop
// ABOUTME: No threads are spawned; the owner calls poll with the current instant

use dockyard_logging::trace;
use std::time::{Duration, Instant};

/// One-shot timer that fires when polled at or after its deadline
#[derive(Debug, Clone)]
pub struct ScheduledTimer {
    name: &'static str,
    delay: Duration,
    deadline: Option<Instant>,
}

impl ScheduledTimer {
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            deadline: None,
        }
    }

    /// Start or restart the timer from `now`
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
        trace!(
            timer = self.name,
            delay_ms = self.delay.as_millis() as u64,
            "Timer started"
        );
    }

    pub fn stop(&mut self) {
        if self.deadline.take().is_some() {
            trace!(timer = self.name, "Timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns true once when the deadline has passed, stopping the timer
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                trace!(timer = self.name, "Timer fired");
                true
            }
            _ => false,
        }
    }
}
