//! In-memory state for the logged-in user.
//!
//! `Session` owns the user's snapshot and the store, and persists the
//! full snapshot after every observed mutation, so the local cache never
//! lags what the user can see.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::debug;

use crate::dates;
use crate::models::{DayMetadata, DayRating, Priority, Task, TaskGroup, TaskStatus};
use crate::store::{UserData, UserDataStore};

pub struct Session {
    store: UserDataStore,
    user: String,
    data: UserData,
}

impl Session {
    /// Load the user's snapshot and start a session on it.
    pub async fn login(store: UserDataStore, user: &str) -> Self {
        let data = store.load(user).await;
        debug!(user, tasks = data.tasks.len(), "session started");
        Self {
            store,
            user: user.to_string(),
            data,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn metadata(&self) -> &BTreeMap<String, DayMetadata> {
        &self.data.metadata
    }

    /// Final save. Mutations already persist as they happen, so this
    /// only matters for callers that mutated `data` through other means.
    pub fn logout(self) {
        self.store.save(&self.user, &self.data);
    }

    fn persist(&self) {
        self.store.save(&self.user, &self.data);
    }

    // ===== Task mutations =====

    /// Create a task. Empty or whitespace-only text is rejected; an empty
    /// date falls back to today.
    pub fn add_task(&mut self, text: &str, date: Option<&str>, priority: Priority) -> Result<&Task> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("task text is empty");
        }

        let date = match date {
            Some(d) if !d.trim().is_empty() => d.trim().to_string(),
            _ => dates::today_string(),
        };

        let task = Task::new(text, date, priority);
        // Newest first, matching how the list is presented.
        self.data.tasks.insert(0, task);
        self.persist();
        Ok(&self.data.tasks[0])
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> bool {
        self.update_task(id, |task| task.status = status)
    }

    pub fn set_priority(&mut self, id: &str, priority: Priority) -> bool {
        self.update_task(id, |task| task.priority = priority)
    }

    pub fn edit_text(&mut self, id: &str, text: &str) -> bool {
        let text = text.to_string();
        self.update_task(id, move |task| task.text = text)
    }

    pub fn set_task_note(&mut self, id: &str, note: &str) -> bool {
        let note = note.to_string();
        self.update_task(id, move |task| task.note = note)
    }

    /// Append text to a task's note, e.g. a generated checklist.
    pub fn append_task_note(&mut self, id: &str, extra: &str) -> bool {
        let extra = extra.to_string();
        self.update_task(id, move |task| {
            if task.note.is_empty() {
                task.note = extra;
            } else {
                task.note.push('\n');
                task.note.push_str(&extra);
            }
        })
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.data.tasks.len();
        self.data.tasks.retain(|t| t.id != id);
        let deleted = self.data.tasks.len() != before;
        if deleted {
            self.persist();
        }
        deleted
    }

    fn update_task(&mut self, id: &str, apply: impl FnOnce(&mut Task)) -> bool {
        let updated = match self.data.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                apply(task);
                true
            }
            None => false,
        };
        if updated {
            self.persist();
        }
        updated
    }

    // ===== Day metadata mutations =====

    /// Rate a day. Picking the rating the day already has clears it.
    pub fn rate_day(&mut self, date: &str, rating: DayRating) {
        let entry = self.data.metadata.entry(date.to_string()).or_default();
        entry.rating = if entry.rating == Some(rating) {
            None
        } else {
            Some(rating)
        };
        self.persist();
    }

    pub fn set_day_note(&mut self, date: &str, note: &str) {
        let entry = self.data.metadata.entry(date.to_string()).or_default();
        entry.note = Some(note.to_string());
        self.persist();
    }

    // ===== Views =====

    /// Group tasks by day for display, newest day first. A non-empty
    /// query filters tasks by case-insensitive substring match.
    pub fn grouped_tasks(&self, query: &str) -> Vec<TaskGroup> {
        group_tasks(&self.data, query)
    }
}

/// Pure grouping/sorting: days descending; within a day, priority weight
/// descending, then newest creation first.
pub fn group_tasks(data: &UserData, query: &str) -> Vec<TaskGroup> {
    let query = query.trim().to_lowercase();
    let today = dates::today_string();

    let mut groups: BTreeMap<String, Vec<Task>> = BTreeMap::new();
    for task in &data.tasks {
        if !query.is_empty() && !task.text.to_lowercase().contains(&query) {
            continue;
        }
        let key = if task.date_string.is_empty() {
            today.clone()
        } else {
            task.date_string.clone()
        };
        groups.entry(key).or_default().push(task.clone());
    }

    groups
        .into_iter()
        .rev()
        .map(|(date, mut tasks)| {
            tasks.sort_by(|a, b| {
                b.priority
                    .weight()
                    .cmp(&a.priority.weight())
                    .then(b.created_at.cmp(&a.created_at))
            });
            let meta = data.metadata.get(&date);
            TaskGroup {
                label: dates::format_label(&date),
                is_past: dates::is_past(&date),
                is_today: date == today,
                rating: meta.and_then(|m| m.rating),
                note: meta.and_then(|m| m.note.clone()),
                date_string: date,
                tasks,
            }
        })
        .collect()
}
