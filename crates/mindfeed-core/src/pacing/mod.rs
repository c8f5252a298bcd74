mod policy;
mod scheduler;
mod session;

pub use policy::{Mode, ModePolicy, DEFAULT_BREAK_DURATION_MS, MINDFUL_TIME_THRESHOLD_MS};
pub use scheduler::{BreakClock, BreakDue, BreakScheduler, DueTrigger};
pub use session::{BreakSession, BreakState};

/// Render milliseconds as `m:ss`, rounding down to whole seconds.
pub fn format_countdown(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
