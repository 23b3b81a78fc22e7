//! Chronos CLI - offline-first personal task tracking.
//!
//! Thin command surface over the library: inspect sync status, export
//! tasks, archive old ones, and fetch optional generated insights.

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chronos::archive;
use chronos::cache::CacheManager;
use chronos::export;
use chronos::insight::{InsightClient, DECOMPOSE_PLACEHOLDER, INSIGHT_PLACEHOLDER};
use chronos::models::{DayRating, Priority, TaskStatus};
use chronos::registry::UserRegistry;
use chronos::remote::{HttpRemoteStore, RemoteConfig, RemoteStore};
use chronos::session::Session;
use chronos::stats::TaskSummary;
use chronos::store::UserDataStore;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: chronos <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                      Show sync mode and known profiles (default)");
    eprintln!("  login <user>                Switch to (creating if needed) a profile");
    eprintln!("  logout                      Clear the active profile");
    eprintln!("  add <text> [date] [prio]    Create a task (date YYYY-MM-DD, prio HIGH|MEDIUM|LOW)");
    eprintln!("  list [query]                List tasks grouped by day, optionally filtered");
    eprintln!("  done <task-id>              Mark a task completed");
    eprintln!("  rate <date> <rating>        Rate a day good|neutral|bad (repeat to clear)");
    eprintln!("  export <user>               Write the user's tasks to a CSV in the current directory");
    eprintln!("  archive <user> [days]       Move tasks older than [days] (default 30) to the archive");
    eprintln!("  insight <user>              Print a generated productivity insight for the last week");
    eprintln!("  breakdown <user> <task-id>  Append a generated checklist to a task's note");
}

fn build_store() -> Result<UserDataStore> {
    let cache = CacheManager::new(CacheManager::default_dir()?)?;

    let remote: Option<Arc<dyn RemoteStore>> = match RemoteConfig::from_env() {
        Some(config) => {
            info!(url = %config.base_url, "remote mirror configured");
            Some(Arc::new(HttpRemoteStore::new(&config)?))
        }
        None => {
            info!("no remote mirror configured, running local-only");
            None
        }
    };

    Ok(UserDataStore::new(cache, remote))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Chronos starting");

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");

    match command {
        "status" => cmd_status().await,
        "login" => match args.get(2) {
            Some(user) => cmd_login(user).await,
            None => {
                print_usage();
                Ok(())
            }
        },
        "logout" => cmd_logout(),
        "add" => match args.get(2) {
            Some(text) => {
                let priority = match args.get(4) {
                    Some(raw) => parse_priority(raw)?,
                    None => Priority::default(),
                };
                cmd_add(text, args.get(3).map(String::as_str), priority).await
            }
            None => {
                print_usage();
                Ok(())
            }
        },
        "list" => cmd_list(args.get(2).map(String::as_str).unwrap_or("")).await,
        "done" => match args.get(2) {
            Some(task_id) => cmd_done(task_id).await,
            None => {
                print_usage();
                Ok(())
            }
        },
        "rate" => match (args.get(2), args.get(3)) {
            (Some(date), Some(raw)) => cmd_rate(date, parse_rating(raw)?).await,
            _ => {
                print_usage();
                Ok(())
            }
        },
        "export" => match args.get(2) {
            Some(user) => cmd_export(user).await,
            None => {
                print_usage();
                Ok(())
            }
        },
        "archive" => match args.get(2) {
            Some(user) => {
                let days = match args.get(3) {
                    Some(raw) => raw.parse()?,
                    None => archive::DEFAULT_ARCHIVE_DAYS,
                };
                cmd_archive(user, days).await
            }
            None => {
                print_usage();
                Ok(())
            }
        },
        "insight" => match args.get(2) {
            Some(user) => cmd_insight(user).await,
            None => {
                print_usage();
                Ok(())
            }
        },
        "breakdown" => match (args.get(2), args.get(3)) {
            (Some(user), Some(task_id)) => cmd_breakdown(user, task_id).await,
            _ => {
                print_usage();
                Ok(())
            }
        },
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn cmd_status() -> Result<()> {
    let store = build_store()?;
    if store.is_remote_active() {
        println!("Sync: remote mirror active");
    } else {
        println!("Sync: local only");
    }

    let mut registry = UserRegistry::new(CacheManager::default_dir()?);
    registry.load()?;
    if registry.users().is_empty() {
        println!("Profiles: none yet");
    } else {
        println!("Profiles:");
        for user in registry.users() {
            let marker = if Some(user.as_str()) == registry.active() {
                " (active)"
            } else {
                ""
            };
            println!("  {}{}", user, marker);
        }
    }
    Ok(())
}

fn parse_priority(raw: &str) -> Result<Priority> {
    match raw.to_ascii_uppercase().as_str() {
        "HIGH" => Ok(Priority::High),
        "MEDIUM" | "MED" => Ok(Priority::Medium),
        "LOW" => Ok(Priority::Low),
        _ => anyhow::bail!("unknown priority: {} (expected HIGH, MEDIUM or LOW)", raw),
    }
}

fn parse_rating(raw: &str) -> Result<DayRating> {
    match raw.to_ascii_uppercase().as_str() {
        "GOOD" => Ok(DayRating::Good),
        "NEUTRAL" => Ok(DayRating::Neutral),
        "BAD" => Ok(DayRating::Bad),
        _ => anyhow::bail!("unknown rating: {} (expected good, neutral or bad)", raw),
    }
}

fn load_registry() -> Result<UserRegistry> {
    let mut registry = UserRegistry::new(CacheManager::default_dir()?);
    registry.load()?;
    Ok(registry)
}

/// The profile commands below act on whoever last ran `login`.
fn active_user() -> Result<String> {
    let registry = load_registry()?;
    registry
        .active()
        .map(String::from)
        .ok_or_else(|| anyhow::anyhow!("no active profile - run `chronos login <name>` first"))
}

async fn active_session() -> Result<Session> {
    let user = active_user()?;
    Ok(Session::login(build_store()?, &user).await)
}

async fn cmd_login(user: &str) -> Result<()> {
    let mut registry = load_registry()?;
    let name = registry.add_profile(user)?;
    registry.set_active(&name)?;

    let session = Session::login(build_store()?, &name).await;
    println!(
        "Logged in as {} ({} tasks, {} annotated days)",
        name,
        session.tasks().len(),
        session.metadata().len()
    );
    Ok(())
}

fn cmd_logout() -> Result<()> {
    let mut registry = load_registry()?;
    registry.clear_active()?;
    println!("Logged out");
    Ok(())
}

async fn cmd_add(text: &str, date: Option<&str>, priority: Priority) -> Result<()> {
    let mut session = active_session().await?;
    let task = session.add_task(text, date, priority)?;
    println!("Added {} ({}, {})", task.id, task.date_string, task.priority);
    Ok(())
}

async fn cmd_list(query: &str) -> Result<()> {
    let session = active_session().await?;
    let groups = session.grouped_tasks(query);

    if groups.is_empty() {
        println!("No tasks found");
        return Ok(());
    }

    for group in groups {
        let rating = match group.rating {
            Some(DayRating::Good) => " [+]",
            Some(DayRating::Neutral) => " [=]",
            Some(DayRating::Bad) => " [-]",
            None => "",
        };
        println!("{} ({}){}", group.label, group.date_string, rating);
        for task in &group.tasks {
            let marker = match task.status {
                TaskStatus::Pending => " ",
                TaskStatus::InProgress => "~",
                TaskStatus::Completed => "x",
            };
            println!(
                "  [{}] {:<6} {}  ({})",
                marker,
                task.priority.to_string(),
                task.text,
                task.id
            );
        }
    }
    Ok(())
}

async fn cmd_done(task_id: &str) -> Result<()> {
    let mut session = active_session().await?;
    if session.set_status(task_id, TaskStatus::Completed) {
        println!("Done");
    } else {
        eprintln!("No task with id {}", task_id);
    }
    Ok(())
}

async fn cmd_rate(date: &str, rating: DayRating) -> Result<()> {
    let mut session = active_session().await?;
    session.rate_day(date, rating);
    match session.metadata().get(date).and_then(|m| m.rating) {
        Some(r) => println!("Rated {} {:?}", date, r),
        None => println!("Cleared rating for {}", date),
    }
    Ok(())
}

async fn cmd_export(user: &str) -> Result<()> {
    let store = build_store()?;
    let data = store.load(user).await;

    let path = export::export_csv_file(&data.tasks, Path::new("."))?;
    println!("Exported {} tasks to {}", data.tasks.len(), path.display());
    Ok(())
}

async fn cmd_archive(user: &str, days: i64) -> Result<()> {
    let cache = CacheManager::new(CacheManager::default_dir()?)?;
    let store = build_store()?;

    let stats = archive::run(&cache, &store, user, days).await?;
    println!(
        "Archive now holds {} tasks, {} completed ({}%)",
        stats.total, stats.completed, stats.percentage
    );
    Ok(())
}

async fn cmd_insight(user: &str) -> Result<()> {
    let store = build_store()?;
    let data = store.load(user).await;
    let summary = TaskSummary::collect(&data.tasks);

    let client = InsightClient::from_env()?;
    match client.analyze(&summary).await {
        Ok(insight) => println!("{}", insight),
        Err(e) => {
            warn!(error = %e, "insight generation failed");
            println!("{}", INSIGHT_PLACEHOLDER);
        }
    }
    Ok(())
}

async fn cmd_breakdown(user: &str, task_id: &str) -> Result<()> {
    let store = build_store()?;
    let mut session = Session::login(store, user).await;

    let task_text = match session.tasks().iter().find(|t| t.id == task_id) {
        Some(task) => task.text.clone(),
        None => {
            eprintln!("No task with id {} for user {}", task_id, user);
            return Ok(());
        }
    };

    let client = InsightClient::from_env()?;
    match client.decompose(&task_text).await {
        Ok(checklist) => {
            session.append_task_note(task_id, &checklist);
            println!("{}", checklist);
        }
        Err(e) => {
            warn!(error = %e, "task breakdown failed");
            println!("{}", DECOMPOSE_PLACEHOLDER);
        }
    }
    Ok(())
}
