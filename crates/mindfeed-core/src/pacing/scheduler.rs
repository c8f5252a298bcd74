//! Break scheduler.
//!
//! Tracks elapsed time and items viewed since the last reset against a
//! [`ModePolicy`]. Remaining time is always re-derived from the wall clock,
//! never decremented, so a suspended caller cannot desynchronize it.
//!
//! The due signal is latched: it fires at most once per reset cycle.

use serde::{Deserialize, Serialize};

use super::policy::ModePolicy;

/// Which threshold produced a due signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueTrigger {
    Time,
    Count,
}

/// One-shot "break due" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakDue {
    pub trigger: DueTrigger,
    pub items_since_reset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakClock {
    pub last_reset_at_ms: u64,
    pub items_since_reset: u64,
}

impl BreakClock {
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_reset_at_ms)
    }

    pub fn time_remaining_ms(&self, threshold_ms: u64, now_ms: u64) -> u64 {
        threshold_ms.saturating_sub(self.elapsed_ms(now_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakScheduler {
    policy: ModePolicy,
    clock: BreakClock,
    signalled: bool,
}

impl BreakScheduler {
    pub fn new(policy: ModePolicy, now_ms: u64) -> Self {
        Self {
            policy,
            clock: BreakClock {
                last_reset_at_ms: now_ms,
                items_since_reset: 0,
            },
            signalled: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn policy(&self) -> &ModePolicy {
        &self.policy
    }

    pub fn clock(&self) -> BreakClock {
        self.clock
    }

    pub fn items_since_reset(&self) -> u64 {
        self.clock.items_since_reset
    }

    pub fn last_reset_at_ms(&self) -> u64 {
        self.clock.last_reset_at_ms
    }

    /// Whether the due signal already fired this cycle.
    pub fn is_signalled(&self) -> bool {
        self.signalled
    }

    /// Time left before the time threshold fires. `None` when unbounded.
    pub fn time_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.policy
            .time_threshold_ms
            .map(|threshold| self.clock.time_remaining_ms(threshold, now_ms))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Re-derive the countdown. Returns the due signal the first time a
    /// threshold is reached in this cycle.
    pub fn tick(&mut self, now_ms: u64) -> Option<BreakDue> {
        if self.signalled {
            return None;
        }

        let trigger = if self.time_remaining_ms(now_ms) == Some(0) {
            DueTrigger::Time
        } else if self
            .policy
            .item_count_threshold
            .is_some_and(|threshold| self.clock.items_since_reset >= threshold)
        {
            DueTrigger::Count
        } else {
            return None;
        };

        self.signalled = true;
        tracing::debug!(?trigger, items = self.clock.items_since_reset, "break due");
        Some(BreakDue {
            trigger,
            items_since_reset: self.clock.items_since_reset,
        })
    }

    /// Count newly loaded items. May fire the count threshold.
    pub fn add_items(&mut self, count: u64, now_ms: u64) -> Option<BreakDue> {
        self.clock.items_since_reset = self.clock.items_since_reset.saturating_add(count);
        self.tick(now_ms)
    }

    /// Start a new cycle at `now_ms`.
    pub fn reset(&mut self, now_ms: u64) {
        self.clock = BreakClock {
            last_reset_at_ms: now_ms,
            items_since_reset: 0,
        };
        self.signalled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_policy(threshold: u64) -> ModePolicy {
        ModePolicy {
            item_count_threshold: Some(threshold),
            time_threshold_ms: None,
            break_duration_ms: 1_000,
        }
    }

    #[test]
    fn count_threshold_fires_once() {
        let mut scheduler = BreakScheduler::new(count_policy(20), 0);
        assert_eq!(scheduler.add_items(10, 0), None);
        let due = scheduler.add_items(10, 0).expect("due at 20 items");
        assert_eq!(due.trigger, DueTrigger::Count);
        assert_eq!(due.items_since_reset, 20);

        assert_eq!(scheduler.add_items(1, 0), None);
        assert_eq!(scheduler.tick(10_000), None);
        assert_eq!(scheduler.items_since_reset(), 21);
    }

    #[test]
    fn reset_rearms_the_latch() {
        let mut scheduler = BreakScheduler::new(count_policy(5), 0);
        assert!(scheduler.add_items(5, 0).is_some());
        scheduler.reset(1_000);
        assert!(!scheduler.is_signalled());
        assert_eq!(scheduler.items_since_reset(), 0);
        assert_eq!(scheduler.last_reset_at_ms(), 1_000);
        assert!(scheduler.add_items(5, 1_000).is_some());
    }

    #[test]
    fn time_threshold_fires_without_items() {
        let mut scheduler = BreakScheduler::new(ModePolicy::mindful(), 1_000);
        assert_eq!(scheduler.time_remaining_ms(1_000), Some(300_000));
        assert_eq!(scheduler.tick(300_999), None);
        assert_eq!(scheduler.time_remaining_ms(300_999), Some(1));

        let due = scheduler.tick(301_000).expect("due at 5:00");
        assert_eq!(due.trigger, DueTrigger::Time);
        assert_eq!(due.items_since_reset, 0);
        assert_eq!(scheduler.time_remaining_ms(400_000), Some(0));
    }

    #[test]
    fn countdown_is_derived_from_clock_not_ticks() {
        let mut scheduler = BreakScheduler::new(ModePolicy::mindful(), 0);
        // A single late tick after a long suspension still sees the full elapsed time.
        assert!(scheduler.tick(10 * 60 * 1000).is_some());
    }

    #[test]
    fn unrestricted_never_fires() {
        let mut scheduler = BreakScheduler::new(ModePolicy::unrestricted(), 0);
        for i in 0..10_000u64 {
            assert_eq!(scheduler.add_items(10, i * 60_000), None);
            assert_eq!(scheduler.tick(i * 60_000 + 1), None);
        }
        assert_eq!(scheduler.time_remaining_ms(u64::MAX), None);
    }
}
