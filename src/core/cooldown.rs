//! Global cooldown gate between accepted intrusion triggers.

use std::time::{Duration, Instant};

/// Minimum spacing between accepted triggers.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

/// Rate limiter shared by every candidate regardless of its source.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    /// Accept a candidate at `now` if at least one window has passed since
    /// the last accepted one (boundary inclusive). Rejections change nothing.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        let open = match self.last_trigger {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if open {
            self.last_trigger = Some(now);
        }
        open
    }

    /// Time left until the gate opens again.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.last_trigger
            .map(|last| self.window.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or(Duration::ZERO)
    }

    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate_accepted() {
        let mut gate = CooldownGate::default();
        let now = Instant::now();
        assert!(gate.try_accept(now));
        assert_eq!(gate.last_trigger(), Some(now));
    }

    #[test]
    fn test_reject_then_accept() {
        let mut gate = CooldownGate::default();
        let t0 = Instant::now();
        assert!(gate.try_accept(t0));

        assert!(!gate.try_accept(t0 + Duration::from_millis(1000)));
        assert_eq!(gate.last_trigger(), Some(t0));

        let later = t0 + Duration::from_millis(3500);
        assert!(gate.try_accept(later));
        assert_eq!(gate.last_trigger(), Some(later));
    }

    #[test]
    fn test_exact_boundary_accepted() {
        let mut gate = CooldownGate::default();
        let t0 = Instant::now();
        assert!(gate.try_accept(t0));
        assert!(!gate.try_accept(t0 + Duration::from_millis(2999)));
        assert!(gate.try_accept(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_accepted_triggers_spaced() {
        let mut gate = CooldownGate::default();
        let t0 = Instant::now();
        let mut accepted = Vec::new();
        // A candidate every 700ms for 20 seconds
        for step in 0..30u64 {
            let now = t0 + Duration::from_millis(step * 700);
            if gate.try_accept(now) {
                accepted.push(now);
            }
        }
        assert!(accepted.len() > 1);
        for pair in accepted.windows(2) {
            assert!(pair[1] - pair[0] >= DEFAULT_COOLDOWN);
        }
    }

    #[test]
    fn test_remaining() {
        let mut gate = CooldownGate::default();
        let t0 = Instant::now();
        assert_eq!(gate.remaining(t0), Duration::ZERO);
        gate.try_accept(t0);
        assert_eq!(gate.remaining(t0 + Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(gate.remaining(t0 + Duration::from_secs(5)), Duration::ZERO);
    }
}
