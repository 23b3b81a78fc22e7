//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! per-user Chronos data locally. Data is cached in JSON format, one
//! file per key, and is the durability floor for every save.
//!
//! Cached data kinds:
//! - Task collections
//! - Per-day metadata mappings
//! - Archived tasks

pub mod manager;

pub use manager::CacheManager;
