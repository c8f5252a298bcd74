//! Break session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> AwaitingChoice -> (Idle | OnBreak -> Completed -> Idle)
//! ```
//!
//! The deadline only moves `OnBreak` to `Completed`; returning to `Idle` is
//! always user-initiated. Appends are permitted only while `Idle`.

use serde::{Deserialize, Serialize};

use super::scheduler::BreakDue;
use crate::clock::timestamp;
use crate::events::Event;

/// Where the session is in the break lifecycle.
///
/// There is no `Due` variant: a due check-in is delivered as
/// [`Event::BreakDue`] and immediately moves an `Idle` session to
/// `AwaitingChoice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BreakState {
    Idle,
    /// A due signal arrived; the prompt is waiting for continue or break.
    AwaitingChoice,
    OnBreak { deadline_ms: u64 },
    /// Break time is over but the user has not resumed yet.
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakSession {
    state: BreakState,
    break_duration_ms: u64,
}

impl BreakSession {
    pub fn new(break_duration_ms: u64) -> Self {
        Self {
            state: BreakState::Idle,
            break_duration_ms,
        }
    }

    pub fn state(&self) -> BreakState {
        self.state
    }

    pub fn break_duration_ms(&self) -> u64 {
        self.break_duration_ms
    }

    /// Applies to breaks started after the call.
    pub fn set_break_duration(&mut self, break_duration_ms: u64) {
        self.break_duration_ms = break_duration_ms;
    }

    /// Whether the feed may grow.
    pub fn permits_append(&self) -> bool {
        self.state == BreakState::Idle
    }

    /// Remaining break time: counting down while on break, zero once
    /// completed, `None` otherwise.
    pub fn break_time_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            BreakState::OnBreak { deadline_ms } => Some(deadline_ms.saturating_sub(now_ms)),
            BreakState::Completed => Some(0),
            _ => None,
        }
    }

    /// `Idle -> AwaitingChoice`.
    pub fn receive_due(&mut self, due: BreakDue, now_ms: u64) -> Option<Event> {
        if self.state != BreakState::Idle {
            return None;
        }
        self.state = BreakState::AwaitingChoice;
        tracing::info!(trigger = ?due.trigger, items = due.items_since_reset, "break prompt shown");
        Some(Event::BreakDue {
            trigger: due.trigger,
            items_since_reset: due.items_since_reset,
            at: timestamp(now_ms),
        })
    }

    /// `AwaitingChoice -> Idle`.
    pub fn continue_feed(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != BreakState::AwaitingChoice {
            return None;
        }
        self.state = BreakState::Idle;
        tracing::info!("break declined, feed continues");
        Some(Event::FeedContinued {
            at: timestamp(now_ms),
        })
    }

    /// `AwaitingChoice -> OnBreak`.
    pub fn accept_break(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != BreakState::AwaitingChoice {
            return None;
        }
        let deadline_ms = now_ms.saturating_add(self.break_duration_ms);
        self.state = BreakState::OnBreak { deadline_ms };
        tracing::info!(duration_ms = self.break_duration_ms, "break started");
        Some(Event::BreakStarted {
            duration_ms: self.break_duration_ms,
            ends_at: timestamp(deadline_ms),
            at: timestamp(now_ms),
        })
    }

    /// `OnBreak -> Completed` once the deadline has passed.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            BreakState::OnBreak { deadline_ms } if now_ms >= deadline_ms => {
                self.state = BreakState::Completed;
                tracing::info!("break completed");
                Some(Event::BreakCompleted {
                    at: timestamp(now_ms),
                })
            }
            _ => None,
        }
    }

    /// `Completed -> Idle`, or `OnBreak -> Idle` when the break is skipped.
    pub fn resume(&mut self, now_ms: u64) -> Option<Event> {
        let skipped = match self.state {
            BreakState::Completed => false,
            BreakState::OnBreak { .. } => true,
            _ => return None,
        };
        self.state = BreakState::Idle;
        tracing::info!(skipped, "resumed from break");
        Some(Event::BreakResumed {
            skipped,
            at: timestamp(now_ms),
        })
    }

    /// Drop any pending intervention.
    pub fn force_idle(&mut self, now_ms: u64) -> Option<Event> {
        if self.state == BreakState::Idle {
            return None;
        }
        let from = self.state;
        self.state = BreakState::Idle;
        tracing::info!(?from, "intervention discarded");
        Some(Event::InterventionDiscarded {
            from,
            at: timestamp(now_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::scheduler::DueTrigger;

    const DUE: BreakDue = BreakDue {
        trigger: DueTrigger::Time,
        items_since_reset: 40,
    };

    #[test]
    fn full_break_cycle() {
        let mut session = BreakSession::new(90_000);
        assert!(session.permits_append());

        assert!(session.receive_due(DUE, 0).is_some());
        assert_eq!(session.state(), BreakState::AwaitingChoice);
        assert!(!session.permits_append());

        assert!(session.accept_break(1_000).is_some());
        assert_eq!(
            session.state(),
            BreakState::OnBreak {
                deadline_ms: 91_000
            }
        );
        assert_eq!(session.break_time_remaining_ms(31_000), Some(60_000));

        assert!(session.tick(90_999).is_none());
        assert!(matches!(session.tick(91_001), Some(Event::BreakCompleted { .. })));
        assert_eq!(session.state(), BreakState::Completed);
        assert_eq!(session.break_time_remaining_ms(200_000), Some(0));

        // Completed never leaves on its own.
        assert!(session.tick(1_000_000).is_none());
        assert_eq!(session.state(), BreakState::Completed);

        match session.resume(1_000_001) {
            Some(Event::BreakResumed { skipped, .. }) => assert!(!skipped),
            other => panic!("Expected BreakResumed, got {other:?}"),
        }
        assert_eq!(session.state(), BreakState::Idle);
    }

    #[test]
    fn continue_returns_to_idle() {
        let mut session = BreakSession::new(90_000);
        session.receive_due(DUE, 0);
        assert!(session.continue_feed(5).is_some());
        assert_eq!(session.state(), BreakState::Idle);
    }

    #[test]
    fn skipping_a_break_is_flagged() {
        let mut session = BreakSession::new(90_000);
        session.receive_due(DUE, 0);
        session.accept_break(0);
        match session.resume(10_000) {
            Some(Event::BreakResumed { skipped, .. }) => assert!(skipped),
            other => panic!("Expected BreakResumed, got {other:?}"),
        }
    }

    #[test]
    fn out_of_order_commands_are_noops() {
        let mut session = BreakSession::new(90_000);
        assert!(session.continue_feed(0).is_none());
        assert!(session.accept_break(0).is_none());
        assert!(session.resume(0).is_none());
        assert!(session.force_idle(0).is_none());

        session.receive_due(DUE, 0);
        assert!(session.receive_due(DUE, 1).is_none());
        assert!(session.resume(2).is_none());
        assert_eq!(session.state(), BreakState::AwaitingChoice);
    }

    #[test]
    fn force_idle_reports_discarded_state() {
        let mut session = BreakSession::new(90_000);
        session.receive_due(DUE, 0);
        session.accept_break(0);
        match session.force_idle(10) {
            Some(Event::InterventionDiscarded { from, .. }) => {
                assert_eq!(from, BreakState::OnBreak { deadline_ms: 90_000 })
            }
            other => panic!("Expected InterventionDiscarded, got {other:?}"),
        }
        assert_eq!(session.break_time_remaining_ms(10), None);
    }
}
