//! One-way data exports: a CSV of the full task collection and a JSON
//! archive file. There is no corresponding import path.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::dates;
use crate::models::Task;

const CSV_HEADER: &str = "Date,Task,Priority,Status,State Label";

/// Render the task collection as CSV, newest date first.
pub fn csv_string(tasks: &[Task]) -> String {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.date_string.cmp(&a.date_string));

    let mut lines = Vec::with_capacity(sorted.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for task in sorted {
        lines.push(format!(
            "{},{},{},{},{}",
            task.date_string,
            quote(&task.text),
            task.priority,
            task.status,
            task.state_label()
        ));
    }
    lines.join("\n")
}

pub fn write_csv<W: Write>(tasks: &[Task], mut out: W) -> Result<()> {
    out.write_all(csv_string(tasks).as_bytes())?;
    Ok(())
}

/// Write `chronos_tasks_export_<today>.csv` into `dir`, returning the path.
pub fn export_csv_file(tasks: &[Task], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("chronos_tasks_export_{}.csv", dates::today_string()));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(tasks, file)?;
    Ok(path)
}

/// Write `chronos-archive-<user>-<today>.json` into `dir`, returning the path.
pub fn export_archive_file(tasks: &[Task], user: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!(
        "chronos-archive-{}-{}.json",
        user,
        dates::today_string()
    ));
    let contents = serde_json::to_string_pretty(tasks)?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// CSV field quoting: wrap in double quotes, doubling any embedded ones.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
