use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{DayMetadata, StoredTask, Task};

/// Directory name under the platform cache dir.
const APP_DIR: &str = "chronos";

/// Key suffix for a user's task collection.
const TASKS_SUFFIX: &str = "tasks";

/// Key suffix for a user's per-day metadata mapping.
const METADATA_SUFFIX: &str = "day_metadata";

/// Key suffix for a user's archived tasks.
const ARCHIVE_SUFFIX: &str = "archive";

/// Durable local key-value cache, one JSON file per key.
///
/// This is the durability floor for all user data: every save lands here
/// synchronously before any remote mirroring is attempted.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Platform default location: `<cache_dir>/chronos`.
    pub fn default_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_DIR))
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn key(user: &str, suffix: &str) -> String {
        format!("{}_{}", user, suffix)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let value: T = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(value))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== Tasks =====

    /// Loads the stored (possibly legacy) form; callers normalize.
    pub fn load_tasks(&self, user: &str) -> Result<Option<Vec<StoredTask>>> {
        self.load(&Self::key(user, TASKS_SUFFIX))
    }

    pub fn save_tasks(&self, user: &str, tasks: &[Task]) -> Result<()> {
        self.save(&Self::key(user, TASKS_SUFFIX), &tasks)
    }

    // ===== Day metadata =====

    pub fn load_day_metadata(&self, user: &str) -> Result<Option<BTreeMap<String, DayMetadata>>> {
        self.load(&Self::key(user, METADATA_SUFFIX))
    }

    pub fn save_day_metadata(
        &self,
        user: &str,
        metadata: &BTreeMap<String, DayMetadata>,
    ) -> Result<()> {
        self.save(&Self::key(user, METADATA_SUFFIX), metadata)
    }

    // ===== Archive =====

    pub fn load_archive(&self, user: &str) -> Result<Option<Vec<Task>>> {
        self.load(&Self::key(user, ARCHIVE_SUFFIX))
    }

    pub fn save_archive(&self, user: &str, tasks: &[Task]) -> Result<()> {
        self.save(&Self::key(user, ARCHIVE_SUFFIX), &tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn manager() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = CacheManager::new(dir.path().to_path_buf()).expect("cache manager");
        (dir, manager)
    }

    #[test]
    fn test_tasks_round_trip() {
        let (_dir, cache) = manager();
        let tasks = vec![Task::new("water plants", "2024-03-01", Priority::Medium)];
        cache.save_tasks("alice", &tasks).expect("save");

        let loaded = cache
            .load_tasks("alice")
            .expect("load")
            .expect("tasks should exist");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "water plants");
        assert_eq!(loaded[0].clone().normalize(), tasks[0]);
    }

    #[test]
    fn test_missing_key_is_none() {
        let (_dir, cache) = manager();
        assert!(cache.load_tasks("nobody").expect("load").is_none());
        assert!(cache.load_day_metadata("nobody").expect("load").is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (dir, cache) = manager();
        std::fs::write(dir.path().join("alice_tasks.json"), "{not json").expect("write");
        assert!(cache.load_tasks("alice").is_err());
    }

    #[test]
    fn test_keys_are_per_user_and_kind() {
        let (dir, cache) = manager();
        cache.save_tasks("alice", &[]).expect("save");
        cache
            .save_day_metadata("alice", &BTreeMap::new())
            .expect("save");
        assert!(dir.path().join("alice_tasks.json").exists());
        assert!(dir.path().join("alice_day_metadata.json").exists());
        assert!(!dir.path().join("bob_tasks.json").exists());
    }
}
