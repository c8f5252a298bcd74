//! Feed loader.
//!
//! Owns the append-only item sequence. Loads are delayed to model fetch
//! latency: each one is a pending deadline resolved by [`FeedLoader::poll`].
//! Every pending load carries the epoch it was scheduled under, and a load
//! whose epoch no longer matches is dropped on resolution.

use serde::{Deserialize, Serialize};

use super::generator::{FeedItem, ImageFeedGenerator};
use super::interests::InterestSet;
use crate::clock::timestamp;
use crate::events::Event;
use crate::pacing::{BreakDue, BreakScheduler, BreakSession};

/// Batch sizes and artificial latencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_initial_batch_size")]
    pub initial_batch_size: usize,
    #[serde(default = "default_append_batch_size")]
    pub append_batch_size: usize,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_append_delay_ms")]
    pub append_delay_ms: u64,
}

fn default_initial_batch_size() -> usize {
    20
}
fn default_append_batch_size() -> usize {
    10
}
fn default_initial_delay_ms() -> u64 {
    400
}
fn default_append_delay_ms() -> u64 {
    300
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            initial_batch_size: default_initial_batch_size(),
            append_batch_size: default_append_batch_size(),
            initial_delay_ms: default_initial_delay_ms(),
            append_delay_ms: default_append_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Initial,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingLoad {
    epoch: u64,
    kind: LoadKind,
    due_at_ms: u64,
}

/// Result of resolving due loads.
#[derive(Debug, Default)]
pub struct PollOutcome {
    pub events: Vec<Event>,
    /// Due signal raised by counting appended items.
    pub due: Option<BreakDue>,
}

#[derive(Debug, Clone)]
pub struct FeedLoader {
    config: LoaderConfig,
    generator: ImageFeedGenerator,
    interests: InterestSet,
    items: Vec<FeedItem>,
    epoch: u64,
    is_initial_loading: bool,
    is_appending: bool,
    liked_only: bool,
    pending: Vec<PendingLoad>,
}

impl FeedLoader {
    pub fn new(config: LoaderConfig, generator: ImageFeedGenerator) -> Self {
        Self {
            config,
            generator,
            interests: InterestSet::default(),
            items: Vec::new(),
            epoch: 0,
            is_initial_loading: false,
            is_appending: false,
            liked_only: false,
            pending: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn interests(&self) -> &InterestSet {
        &self.interests
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_initial_loading(&self) -> bool {
        self.is_initial_loading
    }

    pub fn is_appending(&self) -> bool {
        self.is_appending
    }

    pub fn is_liked_only(&self) -> bool {
        self.liked_only
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Earliest pending deadline, if any load is in flight.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_at_ms).min()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Adopt a new interest set.
    ///
    /// Empty interests clear the feed. A set with the same content as the
    /// current one is a no-op, regardless of order. Anything else starts a
    /// new epoch and schedules its initial batch.
    pub fn initialize(&mut self, interests: InterestSet, now_ms: u64) -> Option<Event> {
        if interests.is_empty() {
            let already_empty = self.interests.is_empty()
                && self.items.is_empty()
                && self.pending.is_empty();
            if already_empty {
                return None;
            }
            self.epoch += 1;
            self.cancel_pending();
            self.items.clear();
            self.interests = interests;
            tracing::info!(epoch = self.epoch, "feed cleared");
            return Some(Event::FeedCleared {
                epoch: self.epoch,
                at: timestamp(now_ms),
            });
        }

        if interests == self.interests && (!self.items.is_empty() || self.is_initial_loading) {
            return None;
        }

        self.interests = interests;
        Some(self.begin_epoch(now_ms))
    }

    /// Start a fresh epoch for the current interests.
    pub fn reload(&mut self, now_ms: u64) -> Option<Event> {
        if self.interests.is_empty() {
            return None;
        }
        Some(self.begin_epoch(now_ms))
    }

    /// Schedule one append batch unless a guard applies.
    pub fn request_more(&mut self, session: &BreakSession, now_ms: u64) -> Option<Event> {
        let blocked = if self.is_appending {
            Some("append in flight")
        } else if self.is_initial_loading {
            Some("initial load in flight")
        } else if !session.permits_append() {
            Some("break session active")
        } else if self.liked_only {
            Some("liked-only view")
        } else if self.interests.is_empty() {
            Some("no interests")
        } else if self.items.is_empty() {
            Some("nothing loaded yet")
        } else {
            None
        };
        if let Some(reason) = blocked {
            tracing::debug!(reason, "request_more ignored");
            return None;
        }

        self.is_appending = true;
        self.pending.push(PendingLoad {
            epoch: self.epoch,
            kind: LoadKind::Append,
            due_at_ms: now_ms.saturating_add(self.config.append_delay_ms),
        });
        Some(Event::AppendScheduled {
            epoch: self.epoch,
            at: timestamp(now_ms),
        })
    }

    /// Resolve every load whose deadline has passed, oldest first.
    ///
    /// Initial batches reset the scheduler; appended batches are counted
    /// against it.
    pub fn poll(&mut self, now_ms: u64, scheduler: &mut BreakScheduler) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if self.pending.iter().all(|p| p.due_at_ms > now_ms) {
            return outcome;
        }

        let (mut ready, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_at_ms <= now_ms);
        self.pending = waiting;
        ready.sort_by_key(|p| p.due_at_ms);

        for load in ready {
            self.resolve(load, now_ms, scheduler, &mut outcome);
        }
        outcome
    }

    pub fn set_liked_only(&mut self, liked_only: bool) {
        self.liked_only = liked_only;
    }

    /// Drop pending appends, e.g. when a break starts.
    pub fn cancel_appends(&mut self) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.kind != LoadKind::Append);
        self.is_appending = false;
        before - self.pending.len()
    }

    /// Drop every pending load. Returns how many were cancelled.
    pub fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.is_initial_loading = false;
        self.is_appending = false;
        if cancelled > 0 {
            tracing::debug!(cancelled, "pending loads cancelled");
        }
        cancelled
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin_epoch(&mut self, now_ms: u64) -> Event {
        self.cancel_pending();
        self.epoch += 1;
        self.is_initial_loading = true;
        self.pending.push(PendingLoad {
            epoch: self.epoch,
            kind: LoadKind::Initial,
            due_at_ms: now_ms.saturating_add(self.config.initial_delay_ms),
        });
        tracing::info!(epoch = self.epoch, topics = self.interests.len(), "feed epoch started");
        Event::FeedLoading {
            epoch: self.epoch,
            at: timestamp(now_ms),
        }
    }

    fn resolve(
        &mut self,
        load: PendingLoad,
        now_ms: u64,
        scheduler: &mut BreakScheduler,
        outcome: &mut PollOutcome,
    ) {
        let at = timestamp(now_ms);
        if load.epoch != self.epoch {
            tracing::debug!(stale = load.epoch, current = self.epoch, "stale batch discarded");
            outcome.events.push(Event::BatchDiscarded {
                epoch: load.epoch,
                current_epoch: self.epoch,
                at,
            });
            return;
        }

        match load.kind {
            LoadKind::Initial => {
                self.items = self.generator.generate(
                    self.interests.topics(),
                    self.config.initial_batch_size,
                    0,
                );
                self.is_initial_loading = false;
                scheduler.reset(now_ms);
                outcome.events.push(Event::FeedInitialized {
                    epoch: self.epoch,
                    count: self.items.len(),
                    at,
                });
            }
            LoadKind::Append => {
                let batch = self.generator.generate(
                    self.interests.topics(),
                    self.config.append_batch_size,
                    self.items.len(),
                );
                let added = batch.len();
                self.items.extend(batch);
                self.is_appending = false;
                if added > 0 {
                    if let Some(due) = scheduler.add_items(added as u64, now_ms) {
                        outcome.due = Some(due);
                    }
                }
                outcome.events.push(Event::ItemsAppended {
                    epoch: self.epoch,
                    added,
                    total: self.items.len(),
                    at,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::{BreakState, DueTrigger, ModePolicy};

    fn loader() -> FeedLoader {
        FeedLoader::new(LoaderConfig::default(), ImageFeedGenerator::default())
    }

    fn session() -> BreakSession {
        BreakSession::new(90_000)
    }

    fn scheduler() -> BreakScheduler {
        BreakScheduler::new(ModePolicy::unrestricted(), 0)
    }

    fn loaded(interests: &[&str]) -> (FeedLoader, BreakScheduler) {
        let mut loader = loader();
        let mut scheduler = scheduler();
        loader.initialize(InterestSet::new(interests.iter().copied()), 0);
        loader.poll(400, &mut scheduler);
        (loader, scheduler)
    }

    #[test]
    fn initialize_waits_for_delay() {
        let mut loader = loader();
        let mut scheduler = scheduler();

        let event = loader.initialize(InterestSet::new(["nature", "office"]), 0);
        assert!(matches!(event, Some(Event::FeedLoading { epoch: 1, .. })));
        assert!(loader.is_initial_loading());
        assert_eq!(loader.next_deadline_ms(), Some(400));

        assert!(loader.poll(399, &mut scheduler).events.is_empty());
        assert!(loader.items().is_empty());

        let outcome = loader.poll(400, &mut scheduler);
        assert!(matches!(
            outcome.events[..],
            [Event::FeedInitialized { epoch: 1, count: 20, .. }]
        ));
        assert!(!loader.is_initial_loading());
        assert_eq!(loader.items()[1].id, "office-1");
        assert_eq!(scheduler.last_reset_at_ms(), 400);
    }

    #[test]
    fn same_content_in_other_order_is_noop() {
        let (mut loader, _) = loaded(&["nature", "office"]);
        assert!(loader
            .initialize(InterestSet::new(["office", "nature"]), 500)
            .is_none());
        assert_eq!(loader.epoch(), 1);
        assert_eq!(loader.items()[0].topic, "nature");
    }

    #[test]
    fn append_counts_items_against_scheduler() {
        let (mut loader, _) = loaded(&["food"]);
        let mut scheduler = BreakScheduler::new(
            ModePolicy {
                item_count_threshold: Some(10),
                time_threshold_ms: None,
                break_duration_ms: 1,
            },
            400,
        );

        assert!(loader.request_more(&session(), 500).is_some());
        assert!(loader.is_appending());
        assert!(loader.request_more(&session(), 510).is_none());

        let outcome = loader.poll(800, &mut scheduler);
        assert!(matches!(
            outcome.events[..],
            [Event::ItemsAppended { added: 10, total: 30, .. }]
        ));
        assert_eq!(outcome.due.map(|d| d.trigger), Some(DueTrigger::Count));
        assert!(!loader.is_appending());
        assert_eq!(loader.items()[29].id, "food-29");
    }

    #[test]
    fn request_more_guards() {
        let mut loader = loader();
        // Nothing loaded and no interests.
        assert!(loader.request_more(&session(), 0).is_none());

        loader.initialize(InterestSet::new(["sport"]), 0);
        // Initial load still pending.
        assert!(loader.request_more(&session(), 10).is_none());

        let mut scheduler = scheduler();
        loader.poll(400, &mut scheduler);

        let mut paused = session();
        paused.receive_due(
            BreakDue {
                trigger: DueTrigger::Time,
                items_since_reset: 0,
            },
            400,
        );
        assert_eq!(paused.state(), BreakState::AwaitingChoice);
        assert!(loader.request_more(&paused, 500).is_none());

        loader.set_liked_only(true);
        assert!(loader.request_more(&session(), 500).is_none());
        loader.set_liked_only(false);
        assert!(loader.request_more(&session(), 500).is_some());
    }

    #[test]
    fn newer_initialize_supersedes_pending_one() {
        let mut loader = loader();
        let mut scheduler = scheduler();
        loader.initialize(InterestSet::new(["nature"]), 0);
        loader.initialize(InterestSet::new(["food"]), 100);

        let outcome = loader.poll(1_000, &mut scheduler);
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(loader.epoch(), 2);
        assert!(loader.items().iter().all(|i| i.topic == "food"));
    }

    #[test]
    fn stale_epoch_batch_is_discarded() {
        let (mut loader, mut scheduler) = loaded(&["nature"]);
        loader.pending.push(PendingLoad {
            epoch: 0,
            kind: LoadKind::Append,
            due_at_ms: 500,
        });

        let outcome = loader.poll(600, &mut scheduler);
        assert!(matches!(
            outcome.events[..],
            [Event::BatchDiscarded { epoch: 0, current_epoch: 1, .. }]
        ));
        assert_eq!(loader.items().len(), 20);
    }

    #[test]
    fn empty_interests_clear_feed() {
        let (mut loader, _) = loaded(&["nature"]);
        loader.request_more(&session(), 500);

        let event = loader.initialize(InterestSet::default(), 600);
        assert!(matches!(event, Some(Event::FeedCleared { epoch: 2, .. })));
        assert!(loader.items().is_empty());
        assert!(!loader.is_appending());
        assert_eq!(loader.next_deadline_ms(), None);

        assert!(loader.initialize(InterestSet::default(), 700).is_none());
    }

    #[test]
    fn cancel_appends_keeps_initial_load() {
        let (mut loader, _) = loaded(&["nature"]);
        loader.request_more(&session(), 500);
        assert_eq!(loader.cancel_appends(), 1);
        assert!(!loader.is_appending());

        loader.reload(600);
        assert_eq!(loader.cancel_appends(), 0);
        assert!(loader.is_initial_loading());
    }
}
