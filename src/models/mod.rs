//! Data models for Chronos entities.
//!
//! - `Task`, `TaskStatus`, `Priority`: a single to-do entry and its enums
//! - `StoredTask`: the persisted form, tolerant of legacy payloads
//! - `DayMetadata`, `DayRating`: per-day rating and journal note
//! - `TaskGroup`: one day's tasks grouped for display

pub mod day;
pub mod task;

pub use day::{DayMetadata, DayRating, TaskGroup};
pub use task::{Priority, StoredTask, Task, TaskStatus};
