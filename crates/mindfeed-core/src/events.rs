use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pacing::{BreakState, DueTrigger, Mode};

/// Every state change in the engine produces an Event.
/// Front ends print or render them; nothing inside the core consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new epoch started and its initial batch is pending.
    FeedLoading {
        epoch: u64,
        at: DateTime<Utc>,
    },
    /// The initial batch of an epoch resolved.
    FeedInitialized {
        epoch: u64,
        count: usize,
        at: DateTime<Utc>,
    },
    /// Interests became empty; items were dropped.
    FeedCleared {
        epoch: u64,
        at: DateTime<Utc>,
    },
    AppendScheduled {
        epoch: u64,
        at: DateTime<Utc>,
    },
    /// An append resolved. `added == 0` means the feed has no more content.
    ItemsAppended {
        epoch: u64,
        added: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    /// A delayed batch resolved under a superseded epoch and was dropped.
    BatchDiscarded {
        epoch: u64,
        current_epoch: u64,
        at: DateTime<Utc>,
    },
    BreakDue {
        trigger: DueTrigger,
        items_since_reset: u64,
        at: DateTime<Utc>,
    },
    /// User dismissed the prompt and kept scrolling.
    FeedContinued {
        at: DateTime<Utc>,
    },
    BreakStarted {
        duration_ms: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The break deadline passed; waiting for the user to resume.
    BreakCompleted {
        at: DateTime<Utc>,
    },
    /// User returned to the feed. `skipped` is set when the break ended early.
    BreakResumed {
        skipped: bool,
        at: DateTime<Utc>,
    },
    /// A pending intervention was dropped by a mode or interest change.
    InterventionDiscarded {
        from: BreakState,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: Mode,
        at: DateTime<Utc>,
    },
    LikeToggled {
        item_id: String,
        liked: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        epoch: u64,
        item_count: usize,
        visible_count: usize,
        liked_only: bool,
        is_initial_loading: bool,
        is_appending: bool,
        break_state: BreakState,
        time_until_break_ms: Option<u64>,
        break_time_remaining_ms: Option<u64>,
        items_since_reset: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant, for terse logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::FeedLoading { .. } => "feed_loading",
            Event::FeedInitialized { .. } => "feed_initialized",
            Event::FeedCleared { .. } => "feed_cleared",
            Event::AppendScheduled { .. } => "append_scheduled",
            Event::ItemsAppended { .. } => "items_appended",
            Event::BatchDiscarded { .. } => "batch_discarded",
            Event::BreakDue { .. } => "break_due",
            Event::FeedContinued { .. } => "feed_continued",
            Event::BreakStarted { .. } => "break_started",
            Event::BreakCompleted { .. } => "break_completed",
            Event::BreakResumed { .. } => "break_resumed",
            Event::InterventionDiscarded { .. } => "intervention_discarded",
            Event::ModeChanged { .. } => "mode_changed",
            Event::LikeToggled { .. } => "like_toggled",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
