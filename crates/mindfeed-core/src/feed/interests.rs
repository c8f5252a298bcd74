//! Interest sets and the topic catalog.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Topics a user can pick from.
pub const AVAILABLE_INTERESTS: [&str; 8] = [
    "nature",
    "office",
    "people",
    "technology",
    "abstract",
    "food",
    "sport",
    "science",
];

/// Ordered topic list with order-insensitive equality.
///
/// The ordered list drives generation; equality and the change-detection key
/// ignore order and duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestSet {
    topics: Vec<String>,
}

impl InterestSet {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = std::collections::HashSet::new();
        let topics = topics
            .into_iter()
            .map(Into::into)
            .map(|t: String| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { topics }
    }

    /// Parse a comma-separated list, e.g. `"nature, office"`.
    pub fn parse_list(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Sorted key used for change detection.
    pub fn key(&self) -> InterestKey {
        let mut sorted = self.topics.clone();
        sorted.sort();
        InterestKey(sorted)
    }
}

impl PartialEq for InterestSet {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for InterestSet {}

/// Canonical form of an [`InterestSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InterestKey(Vec<String>);

impl InterestKey {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pick between two and five catalog topics at random.
pub fn random_interests<R: Rng + ?Sized>(rng: &mut R) -> InterestSet {
    let mut shuffled = AVAILABLE_INTERESTS.to_vec();
    shuffled.shuffle(rng);
    let count = rng.gen_range(2..=5);
    InterestSet::new(shuffled.into_iter().take(count))
}

/// Reproducible variant of [`random_interests`].
pub fn seeded_interests(seed: u64) -> InterestSet {
    random_interests(&mut Pcg64::seed_from_u64(seed))
}
