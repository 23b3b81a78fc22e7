//! Known user profiles and the active session.
//!
//! Deliberately local-only: the remote mirror holds task data, not this
//! device's profile list or who is currently logged in.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::normalize_user;

/// Profile list file name in the cache directory
const USERS_FILE: &str = "users.json";

/// Active-user file name in the cache directory
const ACTIVE_USER_FILE: &str = "active_user.json";

pub struct UserRegistry {
    dir: PathBuf,
    users: Vec<String>,
    active: Option<String>,
}

impl UserRegistry {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            users: Vec::new(),
            active: None,
        }
    }

    /// Load both files from disk; missing files leave the defaults.
    pub fn load(&mut self) -> Result<()> {
        let users_path = self.dir.join(USERS_FILE);
        if users_path.exists() {
            let contents = std::fs::read_to_string(&users_path)
                .context("Failed to read profile list")?;
            self.users = serde_json::from_str(&contents)
                .context("Failed to parse profile list")?;
        }

        let active_path = self.dir.join(ACTIVE_USER_FILE);
        if active_path.exists() {
            let contents = std::fs::read_to_string(&active_path)
                .context("Failed to read active user")?;
            self.active = serde_json::from_str(&contents)
                .context("Failed to parse active user")?;
        }

        Ok(())
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Register a profile name, keeping the display form the user typed.
    /// Duplicate names (after normalization) are not added twice.
    pub fn add_profile(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("profile name is empty");
        }

        let key = normalize_user(name);
        if !self.users.iter().any(|u| normalize_user(u) == key) {
            self.users.push(name.to_string());
            self.save_users()?;
        }
        Ok(name.to_string())
    }

    pub fn set_active(&mut self, name: &str) -> Result<()> {
        self.active = Some(name.trim().to_string());
        self.save_active()
    }

    /// Logout: forget who was logged in, keep the profile list.
    pub fn clear_active(&mut self) -> Result<()> {
        self.active = None;
        let path = self.dir.join(ACTIVE_USER_FILE);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn save_users(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(&self.users)?;
        std::fs::write(self.dir.join(USERS_FILE), contents)?;
        Ok(())
    }

    fn save_active(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(&self.active)?;
        std::fs::write(self.dir.join(ACTIVE_USER_FILE), contents)?;
        Ok(())
    }
}
