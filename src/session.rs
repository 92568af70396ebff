//! Durable session preferences: auth token, user id, remember-login flag and
//! the saved email, persisted as a JSON file next to the app's data.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    token: Option<String>,
    user_id: Option<String>,
    remember_login: bool,
    saved_email: Option<String>,
}

pub struct SessionStore {
    path: PathBuf,
    data: RwLock<SessionData>,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            SessionData::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.data.read().unwrap().token.clone()
    }

    pub fn save_token(&self, token: impl Into<String>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.token = Some(token.into());
        self.persist(&guard)
    }

    /// Logging out drops the user id together with the token.
    pub fn clear_token(&self) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.token = None;
        guard.user_id = None;
        self.persist(&guard)
    }

    pub fn user_id(&self) -> Option<String> {
        self.data.read().unwrap().user_id.clone()
    }

    pub fn save_user_id(&self, user_id: impl Into<String>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.user_id = Some(user_id.into());
        self.persist(&guard)
    }

    pub fn remember_login(&self) -> bool {
        self.data.read().unwrap().remember_login
    }

    pub fn set_remember_login(&self, remember: bool) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.remember_login = remember;
        self.persist(&guard)
    }

    pub fn saved_email(&self) -> Option<String> {
        self.data.read().unwrap().saved_email.clone()
    }

    pub fn save_email(&self, email: impl Into<String>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.saved_email = Some(email.into());
        self.persist(&guard)
    }

    /// Forget the prefill email and turn the remember flag off.
    pub fn clear_saved_login(&self) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.saved_email = None;
        guard.remember_login = false;
        self.persist(&guard)
    }

    fn persist(&self, data: &SessionData) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.json")).unwrap()
    }

    #[test]
    fn values_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        {
            let store = store_in(&dir);
            store.save_token("tok").unwrap();
            store.save_user_id("u-1").unwrap();
            store.set_remember_login(true).unwrap();
            store.save_email("an@visgroup.vn").unwrap();
        }

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.token().as_deref(), Some("tok"));
        assert_eq!(reloaded.user_id().as_deref(), Some("u-1"));
        assert!(reloaded.remember_login());
        assert_eq!(reloaded.saved_email().as_deref(), Some("an@visgroup.vn"));
    }

    #[test]
    fn clearing_token_drops_user_id_too() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save_token("tok").unwrap();
        store.save_user_id("u-1").unwrap();

        store.clear_token().unwrap();
        assert!(store.token().is_none());
        assert!(store.user_id().is_none());
    }

    #[test]
    fn clear_saved_login_resets_flag_and_email() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_remember_login(true).unwrap();
        store.save_email("an@visgroup.vn").unwrap();

        store.clear_saved_login().unwrap();
        assert!(!store.remember_login());
        assert!(store.saved_email().is_none());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(path).unwrap();
        assert!(store.token().is_none());
        assert!(!store.remember_login());
    }
}
