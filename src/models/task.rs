use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates;

/// Task lifecycle states, serialized with their historical wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Task priority. New tasks default to `Low` unless the user picks otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    /// Numeric weight for sorting (higher sorts first within a day).
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// A single to-do entry.
///
/// The wire format is camelCase JSON to stay compatible with snapshots
/// written by earlier releases (`dateString`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, assigned at creation and never changed.
    pub id: String,
    pub text: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Creation time in unix milliseconds, used only to break sort ties.
    pub created_at: i64,
    /// Calendar day (YYYY-MM-DD, local time) this task belongs to.
    pub date_string: String,
    #[serde(default)]
    pub note: String,
}

impl Task {
    pub fn new(text: impl Into<String>, date_string: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            status: TaskStatus::Pending,
            priority,
            created_at: Utc::now().timestamp_millis(),
            date_string: date_string.into(),
            note: String::new(),
        }
    }

    /// Human label used by the CSV export.
    pub fn state_label(&self) -> &'static str {
        if self.status == TaskStatus::Completed {
            "DONE"
        } else if dates::is_past(&self.date_string) {
            "NOT DONE (MISSED)"
        } else if self.status == TaskStatus::InProgress {
            "DOING IT RIGHT NOW"
        } else {
            "PENDING"
        }
    }
}

/// A task as it appears in persisted snapshots.
///
/// Early releases stored a bare `isCompleted` flag and omitted `priority`
/// and `note` entirely; loading accepts those records and upgrades them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub date_string: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl StoredTask {
    /// Convert to the in-memory representation, filling legacy gaps.
    pub fn normalize(self) -> Task {
        let status = self.status.unwrap_or(if self.is_completed == Some(true) {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        });
        Task {
            id: self.id,
            text: self.text,
            status,
            priority: self.priority.unwrap_or_default(),
            created_at: self.created_at,
            date_string: self.date_string,
            note: self.note.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_completed_flag_migrates_to_status() {
        let raw: StoredTask = serde_json::from_str(
            r#"{"id":"a1","text":"ship it","isCompleted":true,"createdAt":1000,"dateString":"2024-03-01"}"#,
        )
        .expect("legacy payload should parse");
        let task = raw.normalize();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.note, "");
    }

    #[test]
    fn test_explicit_status_wins_over_legacy_flag() {
        let raw: StoredTask = serde_json::from_str(
            r#"{"id":"a2","text":"x","status":"IN_PROGRESS","isCompleted":true,"createdAt":0,"dateString":"2024-03-01"}"#,
        )
        .expect("payload should parse");
        assert_eq!(raw.normalize().status, TaskStatus::InProgress);
    }

    #[test]
    fn test_task_wire_format_is_camel_case() {
        let task = Task::new("write tests", "2024-03-01", Priority::High);
        let json = serde_json::to_string(&task).expect("task should serialize");
        assert!(json.contains("\"dateString\":\"2024-03-01\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"priority\":\"HIGH\""));
        assert!(json.contains("\"status\":\"PENDING\""));
    }

    #[test]
    fn test_state_label_completed_beats_past_date() {
        let mut task = Task::new("old", "2000-01-01", Priority::Low);
        task.status = TaskStatus::Completed;
        assert_eq!(task.state_label(), "DONE");
    }

    #[test]
    fn test_state_label_missed_for_past_incomplete() {
        let task = Task::new("old", "2000-01-01", Priority::Low);
        assert_eq!(task.state_label(), "NOT DONE (MISSED)");
    }

    #[test]
    fn test_state_label_in_progress_for_future_date() {
        let mut task = Task::new("soon", "2999-12-31", Priority::Low);
        task.status = TaskStatus::InProgress;
        assert_eq!(task.state_label(), "DOING IT RIGHT NOW");
        task.status = TaskStatus::Pending;
        assert_eq!(task.state_label(), "PENDING");
    }
}
