use serde::{Deserialize, Serialize};

use super::Task;

/// How the user rated a day. Toggling the same rating twice clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayRating {
    Good,
    Neutral,
    Bad,
}

/// Per-day journal entry: an optional rating and an optional free-text note.
/// One exists for every calendar date the user has ever rated or annotated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<DayRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One calendar day's tasks, sorted and labeled for display.
#[derive(Debug, Clone)]
pub struct TaskGroup {
    pub date_string: String,
    pub tasks: Vec<Task>,
    pub label: String,
    pub is_past: bool,
    pub is_today: bool,
    pub rating: Option<DayRating>,
    pub note: Option<String>,
}
