//! Synthetic feed content.
//!
//! Items are derived purely from `(interests, index)`, so any batch can be
//! regenerated byte-for-byte after an epoch change.

use serde::{Deserialize, Serialize};

/// Fixed item width in pixels.
pub const ITEM_WIDTH: u32 = 640;
/// Fixed item height in pixels.
pub const ITEM_HEIGHT: u32 = 360;
/// Image provider prefix used when none is configured.
pub const DEFAULT_PROVIDER: &str = "https://static.photos";

/// One feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedItem {
    /// `"{topic}-{index}"`
    pub id: String,
    pub topic: String,
    /// `"{provider}/{topic}/{width}x{height}/{index}"`
    pub source_url: String,
    pub width: u32,
    pub height: u32,
}

/// Turns an ordered interest list into feed items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFeedGenerator {
    provider: String,
}

impl Default for ImageFeedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER)
    }
}

impl ImageFeedGenerator {
    pub fn new(provider: impl Into<String>) -> Self {
        let provider: String = provider.into();
        Self {
            provider: provider.trim_end_matches('/').to_string(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Generate `count` items starting at global index `start_index`.
    ///
    /// Topics rotate through `interests` by global index. Returns an empty
    /// vector when `interests` is empty.
    pub fn generate(&self, interests: &[String], count: usize, start_index: usize) -> Vec<FeedItem> {
        if interests.is_empty() {
            return Vec::new();
        }

        (start_index..start_index.saturating_add(count))
            .map(|index| {
                let topic = &interests[index % interests.len()];
                FeedItem {
                    id: format!("{topic}-{index}"),
                    topic: topic.clone(),
                    source_url: format!(
                        "{}/{topic}/{ITEM_WIDTH}x{ITEM_HEIGHT}/{index}",
                        self.provider
                    ),
                    width: ITEM_WIDTH,
                    height: ITEM_HEIGHT,
                }
            })
            .collect()
    }
}

/// Generate with the default provider.
pub fn generate(interests: &[String], count: usize, start_index: usize) -> Vec<FeedItem> {
    ImageFeedGenerator::default().generate(interests, count, start_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn alternating_topics() {
        let items = generate(&topics(&["nature", "office"]), 20, 0);
        assert_eq!(items.len(), 20);
        assert_eq!(items[0].id, "nature-0");
        assert_eq!(items[0].topic, "nature");
        assert_eq!(items[1].id, "office-1");
        assert_eq!(items[1].topic, "office");
        assert_eq!(items[19].id, "office-19");
        assert_eq!(items[19].topic, "office");
    }

    #[test]
    fn offset_batch_continues_rotation() {
        let items = generate(&topics(&["a", "b", "c"]), 3, 20);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["c-20", "a-21", "b-22"]);
    }

    #[test]
    fn source_url_template() {
        let items = generate(&topics(&["food"]), 1, 7);
        assert_eq!(items[0].source_url, "https://static.photos/food/640x360/7");
        assert_eq!((items[0].width, items[0].height), (640, 360));
    }

    #[test]
    fn custom_provider_drops_trailing_slash() {
        let generator = ImageFeedGenerator::new("http://localhost:9000/");
        let items = generator.generate(&topics(&["sport"]), 1, 0);
        assert_eq!(items[0].source_url, "http://localhost:9000/sport/640x360/0");
    }

    #[test]
    fn empty_interests_yield_nothing() {
        assert!(generate(&[], 10, 0).is_empty());
    }

    proptest! {
        #[test]
        fn generation_is_deterministic(
            interests in prop::collection::vec("[a-z]{1,8}", 1..6),
            count in 0usize..64,
            start in 0usize..1_000,
        ) {
            prop_assert_eq!(generate(&interests, count, start), generate(&interests, count, start));
        }

        #[test]
        fn ids_are_unique_across_batches(
            interests in prop::collection::hash_set("[a-z]{1,8}", 1..6),
            first in 1usize..40,
            second in 1usize..40,
        ) {
            let interests: Vec<String> = interests.into_iter().collect();
            let mut items = generate(&interests, first, 0);
            items.extend(generate(&interests, second, first));
            let ids: HashSet<_> = items.iter().map(|i| i.id.clone()).collect();
            prop_assert_eq!(ids.len(), first + second);
        }
    }
}
