//! JSON-backed store for liked items (`likes.json` in the data directory).

use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::Result;
use crate::feed::LikedItems;

#[derive(Debug, Clone)]
pub struct LikeStore {
    path: PathBuf,
}

impl LikeStore {
    /// Store in the default data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("likes.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored likes. A missing file is an empty collection; an
    /// unreadable one is logged and treated as empty.
    pub fn load(&self) -> Result<LikedItems> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LikedItems::default())
            }
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str::<LikedItems>(&content) {
            Ok(likes) => Ok(LikedItems::new(likes.items().to_vec())),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring corrupt like store");
                Ok(LikedItems::default())
            }
        }
    }

    pub fn save(&self, likes: &LikedItems) -> Result<()> {
        let json = serde_json::to_string_pretty(likes)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::generate;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LikeStore::at(dir.path().join("likes.json"));
        assert!(store.load().unwrap().is_empty());

        let mut likes = LikedItems::default();
        for item in generate(&["nature".to_string(), "food".to_string()], 3, 0) {
            likes.toggle(&item);
        }
        store.save(&likes).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.is_liked("food-1"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("likes.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(LikeStore::at(path).load().unwrap().is_empty());
    }
}
