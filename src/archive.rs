//! Explicit archiving of old tasks.
//!
//! Tasks older than a cutoff move out of the live snapshot into a
//! local-only archive blob; archiving is always user-initiated, nothing
//! expires on its own.

use anyhow::Result;
use chrono::{Duration, Local};
use tracing::info;

use crate::cache::CacheManager;
use crate::models::{Task, TaskStatus};
use crate::store::{normalize_user, UserDataStore};

/// Default age, in days, past which tasks are considered archivable.
pub const DEFAULT_ARCHIVE_DAYS: i64 = 30;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

/// The date string `days_old` days before today; tasks strictly older
/// are archivable.
pub fn cutoff_string(days_old: i64) -> String {
    (Local::now().date_naive() - Duration::days(days_old))
        .format("%Y-%m-%d")
        .to_string()
}

/// Partition tasks into (older than cutoff, retained).
pub fn split_old(tasks: Vec<Task>, days_old: i64) -> (Vec<Task>, Vec<Task>) {
    let cutoff = cutoff_string(days_old);
    tasks.into_iter().partition(|t| t.date_string < cutoff)
}

pub fn archive_stats(tasks: &[Task]) -> ArchiveStats {
    let total = tasks.len();
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let percentage = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    };
    ArchiveStats {
        total,
        completed,
        percentage,
    }
}

/// Move tasks older than `days_old` out of the user's live snapshot into
/// the local archive blob, then persist both sides. Returns stats over
/// the full archive. The archive accumulates; it is never replaced.
pub async fn run(
    cache: &CacheManager,
    store: &UserDataStore,
    user: &str,
    days_old: i64,
) -> Result<ArchiveStats> {
    let key = normalize_user(user);
    let mut data = store.load(user).await;

    let (old, retained) = split_old(std::mem::take(&mut data.tasks), days_old);
    if old.is_empty() {
        let archive = cache.load_archive(&key)?.unwrap_or_default();
        return Ok(archive_stats(&archive));
    }

    let mut archive = cache.load_archive(&key)?.unwrap_or_default();
    archive.extend(old.iter().cloned());
    cache.save_archive(&key, &archive)?;

    info!(
        user = %key,
        archived = old.len(),
        retained = retained.len(),
        "archived old tasks"
    );

    data.tasks = retained;
    store.save(user, &data);

    Ok(archive_stats(&archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::store::UserData;

    #[test]
    fn test_split_old_partitions_on_cutoff() {
        let tasks = vec![
            Task::new("ancient", "2000-01-01", Priority::Low),
            Task::new("current", crate::dates::today_string(), Priority::Low),
        ];
        let (old, retained) = split_old(tasks, 30);
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].text, "ancient");
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].text, "current");
    }

    #[test]
    fn test_archive_stats_percentage() {
        let mut done = Task::new("done", "2024-01-01", Priority::Low);
        done.status = TaskStatus::Completed;
        let pending = Task::new("pending", "2024-01-01", Priority::Low);

        let stats = archive_stats(&[done, pending]);
        assert_eq!(
            stats,
            ArchiveStats {
                total: 2,
                completed: 1,
                percentage: 50,
            }
        );
        assert_eq!(archive_stats(&[]), ArchiveStats::default());
    }

    #[tokio::test]
    async fn test_run_moves_old_tasks_and_accumulates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("cache");
        let store_cache = CacheManager::new(dir.path().to_path_buf()).expect("cache");
        let store = UserDataStore::new(store_cache, None);

        let mut data = UserData::default();
        data.tasks = vec![
            Task::new("first old", "2000-01-01", Priority::Low),
            Task::new("keep me", crate::dates::today_string(), Priority::Low),
        ];
        store.save("Alice", &data);

        let stats = run(&cache, &store, "Alice", DEFAULT_ARCHIVE_DAYS)
            .await
            .expect("archive run");
        assert_eq!(stats.total, 1);

        let live = store.load("Alice").await;
        assert_eq!(live.tasks.len(), 1);
        assert_eq!(live.tasks[0].text, "keep me");

        // A second old task accumulates on top of the first.
        let mut live = live;
        live.tasks.push(Task::new("second old", "2001-01-01", Priority::Low));
        store.save("Alice", &live);

        let stats = run(&cache, &store, "Alice", DEFAULT_ARCHIVE_DAYS)
            .await
            .expect("archive run");
        assert_eq!(stats.total, 2);

        let archive = cache.load_archive("alice").expect("load").expect("exists");
        assert_eq!(archive.len(), 2);
    }

    #[tokio::test]
    async fn test_run_with_nothing_to_archive_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = CacheManager::new(dir.path().to_path_buf()).expect("cache");
        let store_cache = CacheManager::new(dir.path().to_path_buf()).expect("cache");
        let store = UserDataStore::new(store_cache, None);

        let mut data = UserData::default();
        data.tasks = vec![Task::new("fresh", crate::dates::today_string(), Priority::Low)];
        store.save("alice", &data);

        let stats = run(&cache, &store, "alice", DEFAULT_ARCHIVE_DAYS)
            .await
            .expect("archive run");
        assert_eq!(stats, ArchiveStats::default());
        assert_eq!(store.load("alice").await.tasks.len(), 1);
    }
}
