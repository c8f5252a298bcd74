mod generator;
mod interests;
mod likes;
mod loader;

pub use generator::{
    generate, FeedItem, ImageFeedGenerator, DEFAULT_PROVIDER, ITEM_HEIGHT, ITEM_WIDTH,
};
pub use interests::{random_interests, seeded_interests, InterestKey, InterestSet, AVAILABLE_INTERESTS};
pub use likes::LikedItems;
pub use loader::{FeedLoader, LoaderConfig, PollOutcome};
