//! Productivity analytics over a user's snapshot.
//!
//! All functions here are pure computations; rendering them (charts,
//! dashboards) is someone else's problem. `TaskSummary` is the structured
//! digest submitted to the insight endpoint.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::dates;
use crate::models::{DayMetadata, DayRating, Priority, Task, TaskStatus};

/// Days of history consulted for the rolling performance window.
const PERFORMANCE_WINDOW_DAYS: i64 = 7;

/// Maximum number of active dates in the volume trend.
const VOLUME_TREND_DATES: usize = 14;

/// Upper bound on streak lookback; nobody rates a year of days and then
/// wonders why the counter stopped.
const STREAK_LOOKBACK_DAYS: i64 = 365;

/// Completed / still-active / missed counts across the whole collection.
/// A task is missed when its day has passed and it was never completed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusDistribution {
    pub completed: usize,
    pub active: usize,
    pub missed: usize,
}

pub fn status_distribution(tasks: &[Task]) -> StatusDistribution {
    let mut dist = StatusDistribution::default();
    for task in tasks {
        if task.status == TaskStatus::Completed {
            dist.completed += 1;
        } else if dates::is_past(&task.date_string) {
            dist.missed += 1;
        } else {
            dist.active += 1;
        }
    }
    dist
}

/// One day's numbers in the rolling window.
#[derive(Debug, Clone)]
pub struct DayPerformance {
    pub date_string: String,
    /// Short weekday label ("Mon").
    pub label: String,
    pub completed: usize,
    pub missed: usize,
    pub total: usize,
}

/// Per-day totals for the last seven days, oldest first.
pub fn last_7_days(tasks: &[Task]) -> Vec<DayPerformance> {
    let today = Local::now().date_naive();
    (0..PERFORMANCE_WINDOW_DAYS)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            let date_string = day.format("%Y-%m-%d").to_string();
            let total = tasks.iter().filter(|t| t.date_string == date_string).count();
            let completed = tasks
                .iter()
                .filter(|t| t.date_string == date_string && t.status == TaskStatus::Completed)
                .count();
            DayPerformance {
                label: day.format("%a").to_string(),
                missed: total - completed,
                date_string,
                completed,
                total,
            }
        })
        .collect()
}

/// Tasks created per date, capped to the most recent active dates.
#[derive(Debug, Clone)]
pub struct VolumePoint {
    pub date_string: String,
    /// "Oct 24"-style label.
    pub label: String,
    pub count: usize,
}

pub fn volume_trend(tasks: &[Task]) -> Vec<VolumePoint> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.date_string.clone()).or_default() += 1;
    }

    let skip = counts.len().saturating_sub(VOLUME_TREND_DATES);
    counts
        .into_iter()
        .skip(skip)
        .map(|(date_string, count)| {
            let label = match NaiveDate::parse_from_str(&date_string, "%Y-%m-%d") {
                Ok(d) => d.format("%b %-d").to_string(),
                Err(_) => date_string.clone(),
            };
            VolumePoint {
                date_string,
                label,
                count,
            }
        })
        .collect()
}

/// Completion percentage per weekday, Sunday first.
#[derive(Debug, Clone, Copy)]
pub struct WeekdayEfficiency {
    pub day: &'static str,
    pub efficiency: u32,
}

pub fn day_of_week_efficiency(tasks: &[Task]) -> [WeekdayEfficiency; 7] {
    const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    let mut totals = [0usize; 7];
    let mut completed = [0usize; 7];

    for task in tasks {
        let date = match NaiveDate::parse_from_str(&task.date_string, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => continue,
        };
        let index = date.weekday().num_days_from_sunday() as usize;
        totals[index] += 1;
        if task.status == TaskStatus::Completed {
            completed[index] += 1;
        }
    }

    std::array::from_fn(|i| WeekdayEfficiency {
        day: DAYS[i],
        efficiency: percentage(completed[i], totals[i]),
    })
}

/// Counts of day ratings across all rated days.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SatisfactionCounts {
    pub good: usize,
    pub neutral: usize,
    pub bad: usize,
}

pub fn satisfaction_trends(metadata: &BTreeMap<String, DayMetadata>) -> SatisfactionCounts {
    let mut counts = SatisfactionCounts::default();
    for entry in metadata.values() {
        match entry.rating {
            Some(DayRating::Good) => counts.good += 1,
            Some(DayRating::Neutral) => counts.neutral += 1,
            Some(DayRating::Bad) => counts.bad += 1,
            None => {}
        }
    }
    counts
}

/// Created vs completed per priority level.
#[derive(Debug, Clone, Copy)]
pub struct PriorityStat {
    pub priority: Priority,
    pub total: usize,
    pub completed: usize,
    pub completion_rate: u32,
}

pub fn priority_stats(tasks: &[Task]) -> [PriorityStat; 3] {
    [Priority::High, Priority::Medium, Priority::Low].map(|priority| {
        let total = tasks.iter().filter(|t| t.priority == priority).count();
        let completed = tasks
            .iter()
            .filter(|t| t.priority == priority && t.status == TaskStatus::Completed)
            .count();
        PriorityStat {
            priority,
            total,
            completed,
            completion_rate: percentage(completed, total),
        }
    })
}

/// Consecutive rated days ending today. A not-yet-rated today does not
/// break the chain, it just does not count.
pub fn current_streak(metadata: &BTreeMap<String, DayMetadata>) -> usize {
    let today = Local::now().date_naive();
    let mut streak = 0;

    for back in 0..STREAK_LOOKBACK_DAYS {
        let date_string = (today - Duration::days(back)).format("%Y-%m-%d").to_string();
        let rated = metadata
            .get(&date_string)
            .map(|m| m.rating.is_some())
            .unwrap_or(false);

        if rated {
            streak += 1;
        } else if back > 0 {
            break;
        }
    }

    streak
}

fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

/// The structured digest of the last seven days submitted to the insight
/// endpoint.
#[derive(Debug, Clone)]
pub struct TaskSummary {
    pub total_tasks: usize,
    pub completed: usize,
    pub missed: usize,
    pub completion_rate: u32,
    pub priorities: [PriorityStat; 3],
    /// One line per day, oldest first.
    pub daily_performance: Vec<String>,
}

impl TaskSummary {
    pub fn collect(tasks: &[Task]) -> Self {
        let window = last_7_days(tasks);
        let window_dates: Vec<&str> = window.iter().map(|d| d.date_string.as_str()).collect();
        let window_tasks: Vec<Task> = tasks
            .iter()
            .filter(|t| window_dates.contains(&t.date_string.as_str()))
            .cloned()
            .collect();

        let total_tasks: usize = window.iter().map(|d| d.total).sum();
        let completed: usize = window.iter().map(|d| d.completed).sum();
        let missed = total_tasks - completed;

        let daily_performance = window
            .iter()
            .map(|d| {
                format!(
                    "{} ({}): {}/{} completed",
                    d.label, d.date_string, d.completed, d.total
                )
            })
            .collect();

        Self {
            total_tasks,
            completed,
            missed,
            completion_rate: percentage(completed, total_tasks),
            priorities: priority_stats(&window_tasks),
            daily_performance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(date: &str, status: TaskStatus, priority: Priority) -> Task {
        let mut t = Task::new("t", date, priority);
        t.status = status;
        t
    }

    #[test]
    fn test_status_distribution() {
        let tasks = vec![
            task("2000-01-01", TaskStatus::Completed, Priority::Low),
            task("2000-01-01", TaskStatus::Pending, Priority::Low),
            task("2999-01-01", TaskStatus::Pending, Priority::Low),
            task("2999-01-01", TaskStatus::InProgress, Priority::Low),
        ];
        assert_eq!(
            status_distribution(&tasks),
            StatusDistribution {
                completed: 1,
                missed: 1,
                active: 2,
            }
        );
    }

    #[test]
    fn test_last_7_days_window() {
        let today = dates::today_string();
        let tasks = vec![
            task(&today, TaskStatus::Completed, Priority::Low),
            task(&today, TaskStatus::Pending, Priority::Low),
            task("1999-01-01", TaskStatus::Completed, Priority::Low),
        ];

        let window = last_7_days(&tasks);
        assert_eq!(window.len(), 7);
        let last = window.last().expect("window has today");
        assert_eq!(last.date_string, today);
        assert_eq!(last.total, 2);
        assert_eq!(last.completed, 1);
        assert_eq!(last.missed, 1);
        // The 1999 task falls outside the window entirely.
        assert_eq!(window.iter().map(|d| d.total).sum::<usize>(), 2);
    }

    #[test]
    fn test_volume_trend_caps_active_dates() {
        let mut tasks = Vec::new();
        for day in 1..=20 {
            tasks.push(task(
                &format!("2024-01-{:02}", day),
                TaskStatus::Pending,
                Priority::Low,
            ));
        }
        tasks.push(task("2024-01-20", TaskStatus::Pending, Priority::Low));

        let trend = volume_trend(&tasks);
        assert_eq!(trend.len(), 14);
        // Oldest dates dropped first.
        assert_eq!(trend[0].date_string, "2024-01-07");
        let last = trend.last().unwrap();
        assert_eq!(last.count, 2);
        assert_eq!(last.label, "Jan 20");
    }

    #[test]
    fn test_day_of_week_efficiency() {
        // 2024-03-04 is a Monday.
        let tasks = vec![
            task("2024-03-04", TaskStatus::Completed, Priority::Low),
            task("2024-03-04", TaskStatus::Pending, Priority::Low),
        ];
        let efficiency = day_of_week_efficiency(&tasks);
        assert_eq!(efficiency[1].day, "Mon");
        assert_eq!(efficiency[1].efficiency, 50);
        assert_eq!(efficiency[0].efficiency, 0);
    }

    #[test]
    fn test_satisfaction_trends() {
        let mut metadata = BTreeMap::new();
        for (date, rating) in [
            ("2024-03-01", Some(DayRating::Good)),
            ("2024-03-02", Some(DayRating::Good)),
            ("2024-03-03", Some(DayRating::Bad)),
            ("2024-03-04", None),
        ] {
            metadata.insert(
                date.to_string(),
                DayMetadata {
                    rating,
                    note: None,
                },
            );
        }
        assert_eq!(
            satisfaction_trends(&metadata),
            SatisfactionCounts {
                good: 2,
                neutral: 0,
                bad: 1,
            }
        );
    }

    #[test]
    fn test_priority_stats() {
        let tasks = vec![
            task("2024-03-01", TaskStatus::Completed, Priority::High),
            task("2024-03-01", TaskStatus::Pending, Priority::High),
            task("2024-03-01", TaskStatus::Pending, Priority::Low),
        ];
        let stats = priority_stats(&tasks);
        assert_eq!(stats[0].priority, Priority::High);
        assert_eq!(stats[0].total, 2);
        assert_eq!(stats[0].completed, 1);
        assert_eq!(stats[0].completion_rate, 50);
        assert_eq!(stats[1].total, 0);
        assert_eq!(stats[1].completion_rate, 0);
        assert_eq!(stats[2].total, 1);
    }

    #[test]
    fn test_streak_counts_consecutive_rated_days() {
        let today = Local::now().date_naive();
        let mut metadata = BTreeMap::new();
        for back in 1..=3 {
            metadata.insert(
                (today - Duration::days(back)).format("%Y-%m-%d").to_string(),
                DayMetadata {
                    rating: Some(DayRating::Neutral),
                    note: None,
                },
            );
        }

        // Today unrated: streak holds at 3.
        assert_eq!(current_streak(&metadata), 3);

        // Rating today extends it.
        metadata.insert(
            today.format("%Y-%m-%d").to_string(),
            DayMetadata {
                rating: Some(DayRating::Good),
                note: None,
            },
        );
        assert_eq!(current_streak(&metadata), 4);
    }

    #[test]
    fn test_streak_breaks_on_gap() {
        let today = Local::now().date_naive();
        let mut metadata = BTreeMap::new();
        // Rated two days ago but not yesterday.
        metadata.insert(
            (today - Duration::days(2)).format("%Y-%m-%d").to_string(),
            DayMetadata {
                rating: Some(DayRating::Good),
                note: None,
            },
        );
        assert_eq!(current_streak(&metadata), 0);
    }

    #[test]
    fn test_summary_collects_window_only() {
        let today = dates::today_string();
        let tasks = vec![
            task(&today, TaskStatus::Completed, Priority::High),
            task(&today, TaskStatus::Pending, Priority::Low),
            task("1999-01-01", TaskStatus::Pending, Priority::High),
        ];

        let summary = TaskSummary::collect(&tasks);
        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.completion_rate, 50);
        assert_eq!(summary.priorities[0].total, 1);
        assert_eq!(summary.daily_performance.len(), 7);
    }
}
