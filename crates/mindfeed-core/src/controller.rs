//! Feed controller.
//!
//! Composes the loader, break scheduler and break session under the active
//! [`ModePolicy`] and exposes a single command surface to front ends. The
//! controller never touches component state directly; it only sequences
//! their operations and reads the clock.
//!
//! Nothing runs on its own: the caller invokes [`FeedController::tick`]
//! periodically (every 500 ms is plenty) to resolve loads and countdowns.
//!
//! ## Usage
//!
//! ```ignore
//! let mut feed = FeedController::new(Mode::Mindful, ModePolicy::mindful(),
//!     LoaderConfig::default(), ImageFeedGenerator::default(), Arc::new(SystemClock));
//! feed.set_interests(InterestSet::new(["nature", "office"]));
//! // In a loop:
//! for event in feed.tick() { /* render */ }
//! ```

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::feed::{FeedItem, FeedLoader, ImageFeedGenerator, InterestSet, LikedItems, LoaderConfig};
use crate::pacing::{BreakDue, BreakScheduler, BreakSession, BreakState, Mode, ModePolicy};
use crate::storage::Config;

pub struct FeedController {
    clock: Arc<dyn Clock>,
    mode: Mode,
    loader: FeedLoader,
    scheduler: BreakScheduler,
    session: BreakSession,
    likes: LikedItems,
}

impl FeedController {
    pub fn new(
        mode: Mode,
        policy: ModePolicy,
        loader_config: LoaderConfig,
        generator: ImageFeedGenerator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            mode,
            loader: FeedLoader::new(loader_config, generator),
            scheduler: BreakScheduler::new(policy, now),
            session: BreakSession::new(policy.break_duration_ms),
            likes: LikedItems::default(),
            clock,
        }
    }

    /// Build a controller for `mode` from the user's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured policy for `mode` is invalid.
    pub fn from_config(config: &Config, mode: Mode, clock: Arc<dyn Clock>) -> Result<Self> {
        let policy = config.policy(mode)?;
        Ok(Self::new(
            mode,
            policy,
            config.feed.loader.clone(),
            ImageFeedGenerator::new(config.feed.provider.clone()),
            clock,
        ))
    }

    pub fn with_likes(mut self, likes: LikedItems) -> Self {
        self.likes = likes;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn policy(&self) -> &ModePolicy {
        self.scheduler.policy()
    }

    pub fn interests(&self) -> &InterestSet {
        self.loader.interests()
    }

    pub fn items(&self) -> &[FeedItem] {
        self.loader.items()
    }

    /// Items the front end should show: the liked collection in liked-only
    /// view, the feed otherwise.
    pub fn visible_items(&self) -> &[FeedItem] {
        if self.loader.is_liked_only() {
            self.likes.items()
        } else {
            self.loader.items()
        }
    }

    pub fn likes(&self) -> &LikedItems {
        &self.likes
    }

    pub fn is_initial_loading(&self) -> bool {
        self.loader.is_initial_loading()
    }

    pub fn is_appending(&self) -> bool {
        self.loader.is_appending()
    }

    pub fn break_state(&self) -> BreakState {
        self.session.state()
    }

    /// Countdown to the next check-in. `None` while a break is in progress,
    /// while no interests are selected, or when the policy has no time
    /// threshold.
    pub fn time_until_break(&self) -> Option<u64> {
        if !self.pacing_active() {
            return None;
        }
        self.scheduler.time_remaining_ms(self.clock.now_ms())
    }

    pub fn break_time_remaining(&self) -> Option<u64> {
        self.session.break_time_remaining_ms(self.clock.now_ms())
    }

    pub fn items_since_reset(&self) -> u64 {
        self.scheduler.items_since_reset()
    }

    pub fn last_reset_at_ms(&self) -> u64 {
        self.scheduler.last_reset_at_ms()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            epoch: self.loader.epoch(),
            item_count: self.loader.items().len(),
            visible_count: self.visible_items().len(),
            liked_only: self.loader.is_liked_only(),
            is_initial_loading: self.loader.is_initial_loading(),
            is_appending: self.loader.is_appending(),
            break_state: self.session.state(),
            time_until_break_ms: self.time_until_break(),
            break_time_remaining_ms: self.break_time_remaining(),
            items_since_reset: self.scheduler.items_since_reset(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Adopt the preference store's interest set.
    ///
    /// A content change starts a new epoch and drops any pending
    /// intervention.
    pub fn set_interests(&mut self, interests: InterestSet) -> Vec<Event> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        if let Some(event) = self.loader.initialize(interests, now) {
            events.push(event);
            events.extend(self.restart_pacing(now));
        }
        events
    }

    /// Switch the pacing scenario. The feed reloads under a new epoch.
    pub fn set_mode(&mut self, mode: Mode, policy: ModePolicy) -> Vec<Event> {
        if mode == self.mode && policy == *self.scheduler.policy() {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        self.mode = mode;
        self.scheduler = BreakScheduler::new(policy, now);
        self.session.set_break_duration(policy.break_duration_ms);
        tracing::info!(%mode, "mode changed");

        let mut events = vec![Event::ModeChanged {
            mode,
            at: self.clock.now(),
        }];
        events.extend(self.loader.reload(now));
        events.extend(self.restart_pacing(now));
        events
    }

    /// Scroll proximity reached the end of the feed.
    pub fn request_more(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        self.loader.request_more(&self.session, now)
    }

    /// Decline the break prompt; starts a new cycle and loads one batch.
    pub fn continue_feed(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let Some(event) = self.session.continue_feed(now) else {
            return Vec::new();
        };
        self.scheduler.reset(now);
        let mut events = vec![event];
        events.extend(self.loader.request_more(&self.session, now));
        events
    }

    /// Accept the break prompt.
    pub fn take_break(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let event = self.session.accept_break(now)?;
        self.scheduler.reset(now);
        self.loader.cancel_appends();
        Some(event)
    }

    /// Return to the feed after (or instead of finishing) a break.
    pub fn resume(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let event = self.session.resume(now)?;
        self.scheduler.reset(now);
        Some(event)
    }

    /// Resolve due loads and countdowns.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now_ms();
        let outcome = self.loader.poll(now, &mut self.scheduler);
        let mut events = outcome.events;

        if let Some(due) = outcome.due {
            events.extend(self.raise_due(due, now));
        }
        if self.pacing_active() {
            if let Some(due) = self.scheduler.tick(now) {
                events.extend(self.raise_due(due, now));
            }
        }
        events.extend(self.session.tick(now));
        events
    }

    pub fn set_liked_only(&mut self, liked_only: bool) {
        self.loader.set_liked_only(liked_only);
    }

    /// Like or unlike a loaded (or already liked) item by id.
    pub fn toggle_like(&mut self, item_id: &str) -> Option<Event> {
        let item = self
            .loader
            .items()
            .iter()
            .chain(self.likes.items())
            .find(|item| item.id == item_id)?
            .clone();
        let liked = self.likes.toggle(&item);
        Some(Event::LikeToggled {
            item_id: item.id,
            liked,
            at: self.clock.now(),
        })
    }

    /// Tear down: cancel every pending load and drop any intervention.
    /// Returns the liked items so the caller can persist them.
    pub fn dispose(mut self) -> LikedItems {
        let now = self.clock.now_ms();
        let cancelled = self.loader.cancel_pending();
        self.session.force_idle(now);
        tracing::debug!(cancelled, "controller disposed");
        self.likes
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The countdown only runs while the feed is idle and has interests.
    fn pacing_active(&self) -> bool {
        self.session.permits_append() && !self.loader.interests().is_empty()
    }

    /// Prompt for a break. An append still in flight is dropped so that
    /// continuing starts a clean cycle with exactly one new batch.
    fn raise_due(&mut self, due: BreakDue, now: u64) -> Option<Event> {
        let event = self.session.receive_due(due, now)?;
        self.loader.cancel_appends();
        Some(event)
    }

    fn restart_pacing(&mut self, now: u64) -> Option<Event> {
        self.scheduler.reset(now);
        self.session.force_idle(now)
    }
}
