use serde::{Deserialize, Serialize};

use super::generator::FeedItem;

/// Items the user has liked, in the order they were liked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikedItems {
    items: Vec<FeedItem>,
}

impl LikedItems {
    pub fn new(items: Vec<FeedItem>) -> Self {
        let mut liked = Self::default();
        for item in items {
            if !liked.is_liked(&item.id) {
                liked.items.push(item);
            }
        }
        liked
    }

    /// Like or unlike `item`. Returns `true` if it is liked afterwards.
    pub fn toggle(&mut self, item: &FeedItem) -> bool {
        if let Some(pos) = self.items.iter().position(|i| i.id == item.id) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(item.clone());
            true
        }
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
