//! Credential storage
//!
//! A small synchronous key-value store stands in for the browser's local
//! storage. The access token may sit under any of several historical key
//! names; [`StoredCredentials`] hides that behind [`CredentialProvider`].

use anyhow::{Context, Result, anyhow};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Keys that may hold the access token, in lookup order
pub const TOKEN_KEYS: [&str; 4] = ["jwtToken", "accessToken", "token", "authToken"];

/// Synchronous string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Source of the bearer token for API calls
pub trait CredentialProvider: Send + Sync {
    fn get_token(&self) -> Option<String>;
}

/// Key-value store persisted as a flat TOML table
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store: {}", self.path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse store: {}", self.path.display()))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string(entries).context("Failed to serialize store")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write store: {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                log::warn!("{:#}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// In-process store, mainly for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// Token access on top of a [`KeyValueStore`]
#[derive(Debug)]
pub struct StoredCredentials<S> {
    store: S,
}

impl<S: KeyValueStore> StoredCredentials<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// First key in [`TOKEN_KEYS`] holding a non-blank value, with that value
    pub fn find_token(&self) -> Option<(&'static str, String)> {
        TOKEN_KEYS.iter().find_map(|key| {
            self.store
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v))
        })
    }

    /// Save a token under the primary key
    pub fn store_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEYS[0], token.trim())
    }

    /// Remove the token from every key it might be stored under
    pub fn clear(&self) -> Result<()> {
        for key in TOKEN_KEYS {
            self.store.remove(key)?;
        }
        Ok(())
    }
}

impl<S: KeyValueStore> CredentialProvider for StoredCredentials<S> {
    fn get_token(&self) -> Option<String> {
        self.find_token().map(|(_, token)| token)
    }
}
