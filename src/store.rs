//! Per-user snapshot persistence.
//!
//! `UserDataStore` coordinates two backends: the local JSON cache, which
//! is the durability floor and always written synchronously, and an
//! optional remote mirror, which is preferred on load when it answers and
//! replicated to on save without ever blocking or failing the caller.
//!
//! Every save is a full replace of both portions of the snapshot - there
//! is no merge or conflict resolution anywhere. Concurrent sessions for
//! the same user overwrite each other, last full write wins per backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheManager;
use crate::models::{DayMetadata, StoredTask, Task};
use crate::remote::{RemoteError, RemoteStore};

/// The aggregate persisted per user: the full task collection plus the
/// per-day metadata mapping. This is the unit of load and save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub tasks: Vec<Task>,
    pub metadata: BTreeMap<String, DayMetadata>,
}

/// Normalize a user identifier into a storage key.
/// "Alice", " alice " and "ALICE" all address the same snapshot.
pub fn normalize_user(user: &str) -> String {
    user.trim().to_lowercase()
}

fn tasks_path(user: &str) -> String {
    format!("users/{}/tasks", user)
}

fn metadata_path(user: &str) -> String {
    format!("users/{}/metadata", user)
}

/// Pick the remote snapshot when the mirror answered, else the local
/// fallback. Factored out of `load` so the policy is testable without I/O;
/// the returned error, if any, is only ever logged.
fn resolve_snapshot(
    remote: Option<Result<UserData, RemoteError>>,
    local: UserData,
) -> (UserData, Option<RemoteError>) {
    match remote {
        Some(Ok(data)) => (data, None),
        Some(Err(e)) => (local, Some(e)),
        None => (local, None),
    }
}

pub struct UserDataStore {
    cache: CacheManager,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl UserDataStore {
    /// The remote handle is decided once, at startup; `None` selects
    /// local-only operation for the life of the store.
    pub fn new(cache: CacheManager, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { cache, remote }
    }

    /// Whether a remote mirror was configured at startup.
    /// Capability only - says nothing about current reachability.
    pub fn is_remote_active(&self) -> bool {
        self.remote.is_some()
    }

    /// Load the best available snapshot for `user`.
    ///
    /// Tries the mirror first when configured; any remote failure
    /// (network, auth, malformed payload) falls back silently to the
    /// local cache. Never fails outward - a user with no prior data
    /// gets an empty snapshot. Read-only: the local cache is not
    /// updated from the remote result.
    pub async fn load(&self, user: &str) -> UserData {
        let key = normalize_user(user);

        let remote = match &self.remote {
            Some(remote) => Some(Self::fetch_snapshot(remote.as_ref(), &key).await),
            None => None,
        };

        let (data, error) = resolve_snapshot(remote, self.load_local(&key));
        match error {
            Some(e) => warn!(user = %key, error = %e, "remote load failed, using local cache"),
            None if self.remote.is_some() => debug!(user = %key, "loaded snapshot from remote mirror"),
            None => debug!(user = %key, "loaded snapshot from local cache"),
        }
        data
    }

    /// Persist the full snapshot for `user`.
    ///
    /// The local cache write is synchronous and completes before this
    /// returns; the remote write, when configured, is spawned and
    /// detached - its outcome is observable only in the logs. Both
    /// writes are whole-snapshot replacements.
    pub fn save(&self, user: &str, data: &UserData) {
        let key = normalize_user(user);

        if let Err(e) = self.cache.save_tasks(&key, &data.tasks) {
            warn!(user = %key, error = %e, "failed to write tasks to local cache");
        }
        if let Err(e) = self.cache.save_day_metadata(&key, &data.metadata) {
            warn!(user = %key, error = %e, "failed to write day metadata to local cache");
        }

        self.spawn_mirror_write(&key, data);
    }

    async fn fetch_snapshot(remote: &dyn RemoteStore, key: &str) -> Result<UserData, RemoteError> {
        let tasks = remote.get(&tasks_path(key)).await?;
        let metadata = remote.get(&metadata_path(key)).await?;

        // An absent key on a reachable mirror is authoritative: the user
        // has no data there yet.
        let tasks: Vec<StoredTask> = match tasks {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?,
            None => Vec::new(),
        };
        let metadata: BTreeMap<String, DayMetadata> = match metadata {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?,
            None => BTreeMap::new(),
        };

        Ok(UserData {
            tasks: tasks.into_iter().map(StoredTask::normalize).collect(),
            metadata,
        })
    }

    /// Local-cache snapshot. Unreadable or malformed entries count as
    /// "no prior data" rather than errors.
    fn load_local(&self, key: &str) -> UserData {
        let tasks = match self.cache.load_tasks(key) {
            Ok(Some(stored)) => stored.into_iter().map(StoredTask::normalize).collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(user = %key, error = %e, "unreadable task cache, starting empty");
                Vec::new()
            }
        };
        let metadata = match self.cache.load_day_metadata(key) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(user = %key, error = %e, "unreadable metadata cache, starting empty");
                BTreeMap::new()
            }
        };
        UserData { tasks, metadata }
    }

    /// Dispatch the fire-and-forget mirror write. The caller is never
    /// told whether it succeeded and is never delayed by it.
    fn spawn_mirror_write(&self, key: &str, data: &UserData) {
        let remote = match &self.remote {
            Some(remote) => Arc::clone(remote),
            None => return,
        };

        let tasks = match serde_json::to_value(&data.tasks) {
            Ok(value) => value,
            Err(e) => {
                warn!(user = %key, error = %e, "could not serialize tasks for mirror");
                return;
            }
        };
        let metadata = match serde_json::to_value(&data.metadata) {
            Ok(value) => value,
            Err(e) => {
                warn!(user = %key, error = %e, "could not serialize metadata for mirror");
                return;
            }
        };

        let user = key.to_string();
        tokio::spawn(async move {
            let result = async {
                remote.put(&tasks_path(&user), tasks).await?;
                remote.put(&metadata_path(&user), metadata).await?;
                Ok::<_, RemoteError>(())
            }
            .await;

            match result {
                Ok(()) => debug!(user = %user, "snapshot mirrored to remote"),
                Err(e) => {
                    warn!(user = %user, error = %e, "mirror write failed, snapshot kept locally")
                }
            }
        });
    }
}
