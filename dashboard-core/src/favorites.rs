use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tracing::debug;

use crate::{
    gateway::WeatherGateway,
    model::{TemperatureUnit, WeatherSnapshot},
    render::{Renderer, format_temperature},
    store::PersistenceStore,
};

/// Part of a favorite tag that received a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTarget {
    Label,
    RemoveButton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCommand {
    Load(String),
    Remove(String),
}

/// One entry of the favorites strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteTag {
    pub city: String,
    pub tooltip: Option<String>,
}

impl FavoriteTag {
    fn new(city: &str) -> Self {
        Self { city: city.to_string(), tooltip: None }
    }

    /// Route a click. A click on the remove button is consumed there and never
    /// reaches the tag's load action.
    pub fn click(&self, target: TagTarget) -> TagCommand {
        match target {
            TagTarget::RemoveButton => TagCommand::Remove(self.city.clone()),
            TagTarget::Label => TagCommand::Load(self.city.clone()),
        }
    }
}

#[derive(Debug)]
struct PreviewCache {
    ttl: Duration,
    entries: HashMap<String, (Instant, WeatherSnapshot)>,
}

impl PreviewCache {
    fn fresh(&self, city: &str, now: Instant) -> Option<&WeatherSnapshot> {
        self.entries
            .get(city)
            .filter(|(fetched, _)| now.saturating_duration_since(*fetched) < self.ttl)
            .map(|(_, snapshot)| snapshot)
    }

    fn insert(&mut self, city: &str, snapshot: WeatherSnapshot, now: Instant) {
        self.entries.insert(city.to_string(), (now, snapshot));
    }
}

/// The saved-city list and the strip that displays it.
///
/// Every mutation writes the whole list back to the store and rebuilds the strip.
#[derive(Debug)]
pub struct Favorites {
    cities: Vec<String>,
    strip: Vec<FavoriteTag>,
    previews: PreviewCache,
}

impl Favorites {
    pub fn new(preview_ttl: Duration) -> Self {
        Self {
            cities: Vec::new(),
            strip: Vec::new(),
            previews: PreviewCache { ttl: preview_ttl, entries: HashMap::new() },
        }
    }

    /// Replace the in-memory list with the persisted one, dropping any duplicates.
    pub fn restore(&mut self, store: &PersistenceStore) {
        self.cities.clear();
        for city in store.load_saved_cities() {
            if !self.cities.contains(&city) {
                self.cities.push(city);
            }
        }
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    /// Append `city` unless it is already saved. Returns whether it was added.
    pub fn add(&mut self, city: &str, store: &mut PersistenceStore) -> bool {
        if self.contains(city) {
            return false;
        }
        self.cities.push(city.to_string());
        store.save_saved_cities(&self.cities);
        self.render();
        true
    }

    /// Forget `city` and take its card off screen. Returns whether it was saved.
    pub fn remove(&mut self, city: &str, store: &mut PersistenceStore, cards: &mut Renderer) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| c != city);
        self.previews.entries.remove(city);

        store.save_saved_cities(&self.cities);
        self.render();
        cards.remove_card(city);

        self.cities.len() != before
    }

    pub fn clear_all(&mut self, store: &mut PersistenceStore, cards: &mut Renderer) {
        self.cities.clear();
        self.previews.entries.clear();
        store.save_saved_cities(&self.cities);
        self.render();
        cards.clear();
    }

    /// Rebuild the strip from the list. Always safe to call.
    pub fn render(&mut self) {
        self.strip = self.cities.iter().map(|city| FavoriteTag::new(city)).collect();
    }

    pub fn strip(&self) -> &[FavoriteTag] {
        &self.strip
    }

    pub fn tag(&self, city: &str) -> Option<&FavoriteTag> {
        self.strip.iter().find(|tag| tag.city == city)
    }

    /// Attach a "Temp | description" tooltip to the tag for `city`.
    ///
    /// Lookup failures are swallowed: the tooltip simply stays absent.
    pub async fn hover(
        &mut self,
        city: &str,
        gateway: &dyn WeatherGateway,
        unit: TemperatureUnit,
    ) -> Option<String> {
        self.tag(city)?;

        let now = Instant::now();
        let snapshot = match self.previews.fresh(city, now).cloned() {
            Some(snapshot) => snapshot,
            None => match gateway.fetch_current_by_name(city).await {
                Ok(snapshot) => {
                    self.previews.insert(city, snapshot.clone(), now);
                    snapshot
                }
                Err(err) => {
                    debug!(city, error = %err, "hover preview unavailable");
                    return None;
                }
            },
        };

        let label = format!(
            "Temp: {} | {}",
            format_temperature(snapshot.temperature_f, unit),
            snapshot.condition_description
        );

        if let Some(tag) = self.strip.iter_mut().find(|tag| tag.city == city) {
            tag.tooltip = Some(label.clone());
        }
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, snapshot};
    use rand::{SeedableRng, rngs::StdRng};

    fn fixture() -> (Favorites, PersistenceStore, Renderer) {
        (
            Favorites::new(Duration::from_secs(30)),
            PersistenceStore::in_memory(),
            Renderer::with_rng(StdRng::seed_from_u64(3)),
        )
    }

    #[test]
    fn add_is_idempotent() {
        let (mut favs, mut store, _) = fixture();

        assert!(favs.add("Paris", &mut store));
        assert!(!favs.add("Paris", &mut store));
        favs.add("Rome", &mut store);

        assert_eq!(favs.cities(), ["Paris", "Rome"]);
        assert_eq!(store.load_saved_cities(), ["Paris", "Rome"]);
        assert_eq!(favs.strip().len(), 2);
    }

    #[test]
    fn remove_then_add_moves_city_to_the_end() {
        let (mut favs, mut store, mut cards) = fixture();
        for city in ["Paris", "Rome", "Oslo"] {
            favs.add(city, &mut store);
        }

        assert!(favs.remove("Paris", &mut store, &mut cards));
        favs.add("Paris", &mut store);

        assert_eq!(favs.cities(), ["Rome", "Oslo", "Paris"]);
        assert_eq!(store.load_saved_cities(), ["Rome", "Oslo", "Paris"]);
    }

    #[test]
    fn remove_takes_the_card_off_screen() {
        let (mut favs, mut store, mut cards) = fixture();
        favs.add("Paris", &mut store);
        cards.render_card(&snapshot("Paris", 60.0, 800), TemperatureUnit::Celsius);

        favs.remove("Paris", &mut store, &mut cards);

        assert!(cards.card("Paris").is_none());
        assert!(favs.strip().is_empty());
        assert!(!favs.remove("Paris", &mut store, &mut cards));
    }

    #[test]
    fn clear_all_empties_list_cards_and_store() {
        let (mut favs, mut store, mut cards) = fixture();
        favs.add("Paris", &mut store);
        favs.add("Rome", &mut store);
        cards.render_card(&snapshot("Paris", 60.0, 800), TemperatureUnit::Celsius);

        favs.clear_all(&mut store, &mut cards);

        assert!(favs.cities().is_empty());
        assert!(cards.is_empty());
        assert!(store.load_saved_cities().is_empty());
    }

    #[test]
    fn restore_drops_duplicates_and_render_is_idempotent() {
        let (mut favs, mut store, _) = fixture();
        store.save_saved_cities(&["Paris".into(), "Rome".into(), "Paris".into()]);

        favs.restore(&store);
        favs.render();
        let first = favs.strip().to_vec();
        favs.render();

        assert_eq!(favs.cities(), ["Paris", "Rome"]);
        assert_eq!(favs.strip(), first.as_slice());
    }

    #[test]
    fn remove_button_click_never_loads() {
        let tag = FavoriteTag::new("Paris");

        assert_eq!(tag.click(TagTarget::RemoveButton), TagCommand::Remove("Paris".into()));
        assert_eq!(tag.click(TagTarget::Label), TagCommand::Load("Paris".into()));
    }

    #[tokio::test]
    async fn hover_attaches_tooltip_and_reuses_recent_lookup() {
        let (mut favs, mut store, _) = fixture();
        favs.add("Paris", &mut store);
        let gateway = FakeGateway::new().with_city("Paris", snapshot("Paris", 68.0, 800));

        let label = favs.hover("Paris", &gateway, TemperatureUnit::Celsius).await;
        assert_eq!(label.as_deref(), Some("Temp: 20°C | clear sky"));
        assert_eq!(favs.tag("Paris").unwrap().tooltip.as_deref(), Some("Temp: 20°C | clear sky"));

        let again = favs.hover("Paris", &gateway, TemperatureUnit::Fahrenheit).await;
        assert_eq!(again.as_deref(), Some("Temp: 68°F | clear sky"));
        assert_eq!(gateway.current_calls(), 1);
    }

    #[tokio::test]
    async fn hover_failure_leaves_tooltip_absent() {
        let (mut favs, mut store, _) = fixture();
        favs.add("Atlantis", &mut store);
        let gateway = FakeGateway::new();

        assert!(favs.hover("Atlantis", &gateway, TemperatureUnit::Celsius).await.is_none());
        assert!(favs.tag("Atlantis").unwrap().tooltip.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let mut favs = Favorites::new(Duration::ZERO);
        let mut store = PersistenceStore::in_memory();
        favs.add("Paris", &mut store);
        let gateway = FakeGateway::new().with_city("Paris", snapshot("Paris", 68.0, 800));

        favs.hover("Paris", &gateway, TemperatureUnit::Celsius).await;
        favs.hover("Paris", &gateway, TemperatureUnit::Celsius).await;

        assert_eq!(gateway.current_calls(), 2);
    }
}
