use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, warn};

use crate::model::{Preferences, TemperatureUnit, Theme};

pub const SAVED_CITIES_KEY: &str = "savedCities";
pub const THEME_KEY: &str = "theme";
pub const USE_CELSIUS_KEY: &str = "useCelsius";

/// String-keyed storage that survives restarts.
pub trait KeyValueStore: Send + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// Volatile store, used by tests and as a fallback when no data directory exists.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object of string keys to string values, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist yet.
    ///
    /// A file that is not a JSON object of strings is logged and treated as
    /// empty; the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, entries: BTreeMap::new() });
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {}", path.display()))?;

        let entries = serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable store file");
            BTreeMap::new()
        });

        Ok(Self { path, entries })
    }

    /// Path to the store in the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize store to JSON")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Typed access to the dashboard's persisted keys.
///
/// Write failures are logged and swallowed: the in-memory state stays
/// authoritative for the running session.
#[derive(Debug)]
pub struct PersistenceStore {
    backend: Box<dyn KeyValueStore>,
}

impl PersistenceStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self { backend: Box::new(backend) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    pub fn load_saved_cities(&self) -> Vec<String> {
        let Some(raw) = self.backend.get(SAVED_CITIES_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(cities) => cities,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable saved city list");
                Vec::new()
            }
        }
    }

    pub fn save_saved_cities(&mut self, cities: &[String]) {
        match serde_json::to_string(cities) {
            Ok(json) => self.write(SAVED_CITIES_KEY, json),
            Err(err) => error!(error = %err, "failed to serialize saved city list"),
        }
    }

    pub fn load_theme(&self) -> Theme {
        self.backend
            .get(THEME_KEY)
            .map(|value| Theme::parse_lenient(&value))
            .unwrap_or_default()
    }

    pub fn save_theme(&mut self, theme: Theme) {
        self.write(THEME_KEY, theme.as_str().to_string());
    }

    /// Only the literal "false" selects Fahrenheit; anything else means Celsius.
    pub fn load_unit(&self) -> TemperatureUnit {
        let use_celsius = self.backend.get(USE_CELSIUS_KEY).as_deref() != Some("false");
        TemperatureUnit::from_use_celsius(use_celsius)
    }

    pub fn save_unit(&mut self, unit: TemperatureUnit) {
        self.write(USE_CELSIUS_KEY, unit.use_celsius().to_string());
    }

    pub fn load_preferences(&self) -> Preferences {
        Preferences {
            theme: self.load_theme(),
            unit: self.load_unit(),
        }
    }

    /// Raw value under `key`, mostly useful for diagnostics.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.backend.get(key)
    }

    fn write(&mut self, key: &str, value: String) {
        if let Err(err) = self.backend.set(key, value) {
            error!(key, error = %err, "failed to persist value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_yield_defaults() {
        let store = PersistenceStore::in_memory();

        assert!(store.load_saved_cities().is_empty());
        assert_eq!(store.load_theme(), Theme::Light);
        assert_eq!(store.load_unit(), TemperatureUnit::Celsius);
    }

    #[test]
    fn values_use_the_documented_encodings() {
        let mut store = PersistenceStore::in_memory();

        store.save_saved_cities(&["London".to_string(), "Paris".to_string()]);
        store.save_theme(Theme::Dark);
        store.save_unit(TemperatureUnit::Fahrenheit);

        assert_eq!(store.raw(SAVED_CITIES_KEY).as_deref(), Some(r#"["London","Paris"]"#));
        assert_eq!(store.raw(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(store.raw(USE_CELSIUS_KEY).as_deref(), Some("false"));
        assert_eq!(store.load_unit(), TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn corrupt_city_list_is_treated_as_empty() {
        let mut backend = MemoryStore::default();
        backend.set(SAVED_CITIES_KEY, "{not json".into()).unwrap();
        let store = PersistenceStore::new(backend);

        assert!(store.load_saved_cities().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = PersistenceStore::new(FileStore::open(&path).unwrap());
        store.save_saved_cities(&["Tokyo".to_string()]);
        store.save_theme(Theme::Dark);

        let reopened = PersistenceStore::new(FileStore::open(&path).unwrap());
        assert_eq!(reopened.load_saved_cities(), vec!["Tokyo".to_string()]);
        assert_eq!(reopened.load_theme(), Theme::Dark);
    }

    #[test]
    fn unparseable_store_file_starts_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.get(SAVED_CITIES_KEY).is_none());

        store.set(SAVED_CITIES_KEY, "[]".to_string()).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(SAVED_CITIES_KEY).as_deref(), Some("[]"));
    }
}
