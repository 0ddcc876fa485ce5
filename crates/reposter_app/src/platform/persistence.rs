use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use reposter_core::{Configuration, DEFAULT_DELAY_SECONDS};
use reposter_engine::{AtomicFile, PersistError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CDP_ENDPOINT: &str = "http://127.0.0.1:9222";
const DEFAULT_TARGET_URL_CONTAINS: &str = "x.com";

/// Everything the store keeps between runs. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredSettings {
    /// Newline-delimited, as typed.
    pub match_terms: String,
    pub delay_seconds: u64,
    pub favorite_enabled: bool,
    pub is_running: bool,
    pub cdp_endpoint: String,
    pub target_url_contains: String,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            match_terms: String::new(),
            delay_seconds: DEFAULT_DELAY_SECONDS,
            favorite_enabled: true,
            is_running: false,
            cdp_endpoint: DEFAULT_CDP_ENDPOINT.to_string(),
            target_url_contains: DEFAULT_TARGET_URL_CONTAINS.to_string(),
        }
    }
}

impl StoredSettings {
    pub fn configuration(&self) -> Configuration {
        Configuration::from_lines(&self.match_terms, self.delay_seconds, self.favorite_enabled)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// RON-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    file: AtomicFile,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the store. A missing or unreadable file yields defaults.
    pub fn load(&self) -> StoredSettings {
        let path = self.file.path();
        let content = match self.file.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                engine_info!("No settings at {:?}, using defaults", path);
                return StoredSettings::default();
            }
            Err(err) => {
                engine_warn!("Failed to read settings from {:?}: {}", path, err);
                return StoredSettings::default();
            }
        };

        match ron::from_str(&content) {
            Ok(settings) => {
                engine_info!("Loaded settings from {:?}", path);
                settings
            }
            Err(err) => {
                engine_warn!("Failed to parse settings from {:?}: {}", path, err);
                StoredSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(settings, pretty)?;
        self.file.write(&content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path().join("settings.ron"));
        let settings = store.load();
        assert_eq!(settings, StoredSettings::default());
        assert_eq!(settings.cdp_endpoint, "http://127.0.0.1:9222");
        assert_eq!(settings.target_url_contains, "x.com");
        assert!(settings.favorite_enabled);
    }

    #[test]
    fn saved_settings_load_back() {
        let temp = TempDir::new().unwrap();
        let store = SettingsStore::new(temp.path().join("nested").join("settings.ron"));
        let settings = StoredSettings {
            match_terms: "#rust\ntokio".to_string(),
            delay_seconds: 8,
            favorite_enabled: false,
            is_running: true,
            ..StoredSettings::default()
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);

        let config = settings.configuration();
        assert_eq!(config.match_terms(), ["#rust", "tokio"]);
        assert!(!config.favorite_enabled());
    }

    #[test]
    fn keys_use_camel_case_and_missing_keys_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(&path, r#"(matchTerms: "foo", isRunning: true)"#).unwrap();

        let settings = SettingsStore::new(&path).load();
        assert_eq!(settings.match_terms, "foo");
        assert!(settings.is_running);
        assert_eq!(settings.delay_seconds, DEFAULT_DELAY_SECONDS);

        SettingsStore::new(&path).save(&settings).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("delaySeconds"));
        assert!(written.contains("targetUrlContains"));
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(&path, "not ron at all {").unwrap();
        assert_eq!(SettingsStore::new(&path).load(), StoredSettings::default());
    }
}
