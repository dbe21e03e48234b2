//! Persisted key-value preferences.
//!
//! Holds the auth token, appearance settings and the one-time `init` flag in
//! a small JSON file. An in-memory store without a path is used in tests.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::constants::{PREF_COLOR, PREF_INIT, PREF_SETTINGS, PREF_THEME, PREF_TOKEN};

/// Light/dark preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Appearance settings, stored as JSON under the `settings` key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            color: "default".to_string(),
        }
    }
}

/// Key-value preference store backed by a JSON file.
#[derive(Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl PreferenceStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse preferences: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            values: Arc::new(Mutex::new(values)),
        })
    }

    /// Store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("Preference store lock poisoned"))
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write preferences: {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value.into());
        self.persist(&values)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.lock()?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }

    /// Saved auth token, if any.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.get(PREF_TOKEN)?.filter(|token| !token.is_empty()))
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.set(PREF_TOKEN, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.remove(PREF_TOKEN)
    }

    /// Appearance settings; malformed or missing values give the defaults.
    pub fn settings(&self) -> Result<Settings> {
        let settings = self
            .get(PREF_SETTINGS)?
            .and_then(|raw| serde_json::from_str::<Settings>(&raw).ok())
            .unwrap_or_default();
        Ok(settings)
    }

    /// Save appearance settings, mirrored into the `theme` and `color` keys.
    pub fn set_settings(&self, settings: &Settings) -> Result<()> {
        let mut values = self.lock()?;
        values.insert(PREF_SETTINGS.to_string(), serde_json::to_string(settings)?);
        values.insert(PREF_THEME.to_string(), settings.theme.as_str().to_string());
        values.insert(PREF_COLOR.to_string(), settings.color.clone());
        self.persist(&values)
    }

    /// Whether first-run bootstrap already happened.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.get(PREF_INIT)?.is_some())
    }

    /// Record that first-run bootstrap happened.
    pub fn mark_initialized(&self) -> Result<()> {
        self.set(PREF_INIT, chrono::Utc::now().to_rfc3339())
    }
}
