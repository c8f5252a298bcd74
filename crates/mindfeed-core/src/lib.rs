//! # Mindfeed Core Library
//!
//! This library provides the pacing engine behind Mindfeed: an infinitely
//! scrollable synthetic image feed that runs under one of two pacing
//! policies. The **mindful** policy interrupts the feed with a "take a break"
//! prompt on a timer; the **unrestricted** policy never does.
//!
//! ## Architecture
//!
//! - **Feed**: pure item generation, interest sets, and a loader that pages
//!   items in behind an artificial latency, guarded by generation epochs
//! - **Pacing**: mode policies, a wall-clock break scheduler with a latched
//!   due signal, and the break session state machine
//! - **Controller**: composes both and exposes one command surface; the
//!   caller drives it by invoking `tick()` periodically
//! - **Storage**: TOML configuration and a JSON like store
//!
//! ## Key Components
//!
//! - [`FeedController`]: Command surface for front ends
//! - [`FeedLoader`]: Item sequence owner
//! - [`BreakScheduler`] / [`BreakSession`]: Intervention timing and lifecycle
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod feed;
pub mod pacing;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::FeedController;
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use feed::{FeedItem, FeedLoader, ImageFeedGenerator, InterestSet, LikedItems, LoaderConfig};
pub use pacing::{BreakScheduler, BreakSession, BreakState, DueTrigger, Mode, ModePolicy};
pub use storage::{Config, LikeStore};
