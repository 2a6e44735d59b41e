use std::time::Duration;

use crate::{
    favorites::Favorites,
    model::{Preferences, TemperatureUnit, Theme},
    render::Renderer,
    store::PersistenceStore,
};

/// Everything the dashboard remembers between runs, with persistence injected.
///
/// Setters write through to the store immediately.
#[derive(Debug)]
pub struct AppState {
    store: PersistenceStore,
    preferences: Preferences,
    favorites: Favorites,
}

impl AppState {
    pub fn new(store: PersistenceStore, preview_ttl: Duration) -> Self {
        Self {
            store,
            preferences: Preferences::default(),
            favorites: Favorites::new(preview_ttl),
        }
    }

    pub fn load_theme(&mut self) -> Theme {
        self.preferences.theme = self.store.load_theme();
        self.preferences.theme
    }

    pub fn load_unit(&mut self) -> TemperatureUnit {
        self.preferences.unit = self.store.load_unit();
        self.preferences.unit
    }

    pub fn load_favorites(&mut self) {
        self.favorites.restore(&self.store);
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.preferences.theme = theme;
        self.store.save_theme(theme);
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.preferences.unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.preferences.unit = unit;
        self.store.save_unit(unit);
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut Favorites {
        &mut self.favorites
    }

    pub fn add_favorite(&mut self, city: &str) -> bool {
        self.favorites.add(city, &mut self.store)
    }

    pub fn remove_favorite(&mut self, city: &str, cards: &mut Renderer) -> bool {
        self.favorites.remove(city, &mut self.store, cards)
    }

    pub fn clear_favorites(&mut self, cards: &mut Renderer) {
        self.favorites.clear_all(&mut self.store, cards);
    }

    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};

    #[test]
    fn setters_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut state = AppState::new(
            PersistenceStore::new(FileStore::open(&path).unwrap()),
            Duration::from_secs(30),
        );
        state.set_theme(Theme::Dark);
        state.set_unit(TemperatureUnit::Fahrenheit);
        state.add_favorite("Lisbon");

        let mut reloaded = AppState::new(
            PersistenceStore::new(FileStore::open(&path).unwrap()),
            Duration::from_secs(30),
        );
        assert_eq!(reloaded.load_theme(), Theme::Dark);
        assert_eq!(reloaded.load_unit(), TemperatureUnit::Fahrenheit);
        reloaded.load_favorites();
        assert_eq!(reloaded.favorites().cities(), ["Lisbon"]);
    }

    #[test]
    fn starts_from_defaults_until_loaded() {
        let state = AppState::new(PersistenceStore::new(MemoryStore::default()), Duration::ZERO);

        assert_eq!(state.preferences(), Preferences::default());
        assert!(state.favorites().cities().is_empty());
    }
}
