//! Locally persisted UI preferences.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::models::Preferences;
use crate::{Error, Result};

const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Storage for the preference set.
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Preferences>;
    fn save(&self, preferences: &Preferences) -> Result<()>;
}

/// JSON file store, `<config dir>/voia/preferences.json` by default.
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Failed to resolve config directory".to_string()))?;
        Ok(Self::new(dir.join("voia").join(PREFERENCES_FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(preferences)?)?;
        Ok(())
    }
}

/// Process-local store, used when nothing should touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    saved: Arc<Mutex<Option<Preferences>>>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences> {
        let saved = self
            .saved
            .lock()
            .map_err(|_| Error::Config("Preference store lock poisoned".to_string()))?;
        Ok(saved.unwrap_or_default())
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| Error::Config("Preference store lock poisoned".to_string()))?;
        *saved = Some(*preferences);
        Ok(())
    }
}

/// Preferences loaded once at startup, written through on change.
#[derive(Debug)]
pub struct PreferencesService<S> {
    store: S,
    current: Preferences,
}

impl<S: PreferenceStore> PreferencesService<S> {
    /// Load the stored preferences. A store that cannot be read yields the
    /// defaults.
    pub fn load(store: S) -> Self {
        let current = store.load().unwrap_or_else(|error| {
            tracing::warn!(%error, "Failed to load preferences, using defaults");
            Preferences::default()
        });
        Self { store, current }
    }

    #[must_use]
    pub const fn preferences(&self) -> Preferences {
        self.current
    }

    #[must_use]
    pub const fn dark_mode(&self) -> bool {
        self.current.dark_mode
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<()> {
        let next = Preferences { dark_mode: enabled };
        self.store.save(&next)?;
        self.current = next;
        Ok(())
    }

    /// Flip dark mode and return the new value.
    pub fn toggle_dark_mode(&mut self) -> Result<bool> {
        let enabled = !self.current.dark_mode;
        self.set_dark_mode(enabled)?;
        Ok(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePreferenceStore::new(dir.path().join("nested").join("prefs.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn dark_mode_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voia").join(PREFERENCES_FILE_NAME);

        let mut service = PreferencesService::load(JsonFilePreferenceStore::new(&path));
        assert!(!service.dark_mode());
        assert!(service.toggle_dark_mode().unwrap());

        let reloaded = PreferencesService::load(JsonFilePreferenceStore::new(&path));
        assert!(reloaded.dark_mode());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFilePreferenceStore::new(&path);
        assert!(store.load().is_err());
        assert!(!PreferencesService::load(store).dark_mode());
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryPreferenceStore::default();
        let mut service = PreferencesService::load(store.clone());
        service.set_dark_mode(true).unwrap();
        assert!(store.load().unwrap().dark_mode);
    }
}
