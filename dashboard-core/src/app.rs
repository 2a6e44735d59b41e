use futures::future::join_all;
use std::{
    slice,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    favorites::{TagCommand, TagTarget},
    gateway::WeatherGateway,
    model::{TemperatureUnit, Theme, WeatherSnapshot},
    render::{RemoveCity, Renderer},
    state::AppState,
    store::PersistenceStore,
};

/// How long an error banner stays up.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

/// A transient, auto-dismissing error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    message: String,
    raised_at: Instant,
}

impl Banner {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < BANNER_TTL
    }
}

/// Header indicator for the most recently looked-up location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayNight {
    Day,
    Night,
}

impl DayNight {
    pub fn symbol(&self) -> &'static str {
        match self {
            DayNight::Day => "☀️",
            DayNight::Night => "🌙",
        }
    }
}

/// Why a device location could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationFailure {
    Unsupported,
    Unavailable,
}

/// Wires user events to the gateway, renderer and persisted state.
///
/// Fetches for different cities run concurrently and are applied in the order
/// they were issued. Two fetches for the same city are not deduplicated; the
/// one applied last wins.
#[derive(Debug)]
pub struct App {
    state: AppState,
    renderer: Renderer,
    gateway: Box<dyn WeatherGateway>,
    banner: Option<Banner>,
    day_night: Option<DayNight>,
}

impl App {
    pub fn new(
        gateway: Box<dyn WeatherGateway>,
        store: PersistenceStore,
        preview_ttl: Duration,
    ) -> Self {
        Self {
            state: AppState::new(store, preview_ttl),
            renderer: Renderer::new(),
            gateway,
            banner: None,
            day_night: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Load theme, then unit, then draw the favorites strip. No network access.
    pub fn restore(&mut self) {
        self.state.load_theme();
        self.state.load_unit();
        self.state.load_favorites();
        self.state.favorites_mut().render();
    }

    /// Full startup: restore, then fetch and render a card for every saved city.
    pub async fn init(&mut self) {
        self.restore();

        let cities = self.state.favorites().cities().to_vec();
        if cities.is_empty() {
            return;
        }
        info!(count = cities.len(), "refreshing saved cities");

        let results =
            join_all(cities.iter().map(|city| self.gateway.fetch_current_by_name(city))).await;

        let mut shown = Vec::with_capacity(cities.len());
        for (city, result) in cities.iter().zip(results) {
            match result {
                Ok(snapshot) => {
                    self.show(&snapshot);
                    shown.push(snapshot.city_name);
                }
                Err(err) => self.city_lookup_failed(city, &err),
            }
        }

        self.load_forecasts(&shown).await;
    }

    /// Handle the search form. Blank input is ignored.
    ///
    /// Returns the resolved city name on success.
    pub async fn submit(&mut self, input: &str) -> Option<String> {
        let city = input.trim();
        if city.is_empty() {
            return None;
        }
        self.fetch_and_display(city).await
    }

    /// Look `city` up, render its card, save the resolved name and load its forecast.
    ///
    /// On failure nothing but the banner changes.
    pub async fn fetch_and_display(&mut self, city: &str) -> Option<String> {
        match self.gateway.fetch_current_by_name(city).await {
            Ok(snapshot) => {
                self.show(&snapshot);
                self.load_forecasts(slice::from_ref(&snapshot.city_name)).await;
                Some(snapshot.city_name)
            }
            Err(err) => {
                self.city_lookup_failed(city, &err);
                None
            }
        }
    }

    /// Same as [`App::fetch_and_display`] for a device position.
    pub async fn locate(&mut self, lat: f64, lon: f64) -> Option<String> {
        match self.gateway.fetch_current_by_coordinates(lat, lon).await {
            Ok(snapshot) => {
                self.show(&snapshot);
                self.load_forecasts(slice::from_ref(&snapshot.city_name)).await;
                Some(snapshot.city_name)
            }
            Err(err) => {
                warn!(lat, lon, error = %err, "location weather lookup failed");
                self.raise("Unable to fetch location weather.");
                None
            }
        }
    }

    pub fn location_failed(&mut self, failure: LocationFailure) {
        match failure {
            LocationFailure::Unsupported => self.raise("Geolocation not supported."),
            LocationFailure::Unavailable => self.raise("Unable to retrieve location."),
        }
    }

    /// Dispatch a click on a favorite tag.
    pub async fn click_favorite(&mut self, city: &str, target: TagTarget) {
        let Some(command) = self.state.favorites().tag(city).map(|tag| tag.click(target)) else {
            return;
        };

        match command {
            TagCommand::Load(city) => {
                self.fetch_and_display(&city).await;
            }
            TagCommand::Remove(city) => self.remove_city(&city),
        }
    }

    pub async fn hover_favorite(&mut self, city: &str) -> Option<String> {
        let unit = self.state.unit();
        self.state
            .favorites_mut()
            .hover(city, self.gateway.as_ref(), unit)
            .await
    }

    /// Shared by a card's remove control and a tag's remove button.
    pub fn remove_city(&mut self, city: &str) {
        self.state.remove_favorite(city, &mut self.renderer);
    }

    /// Handle a card's remove control.
    pub fn remove_card(&mut self, control: RemoveCity) {
        self.remove_city(&control.0);
    }

    pub fn delete_all(&mut self) {
        self.state.clear_favorites(&mut self.renderer);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.theme().toggled();
        self.state.set_theme(theme);
        theme
    }

    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        let unit = self.state.unit().toggled();
        self.set_unit(unit);
        unit
    }

    /// Persist `unit` and reformat every temperature on screen.
    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.state.set_unit(unit);
        self.renderer.reformat_all(unit);
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.unit()
    }

    pub fn theme(&self) -> Theme {
        self.state.theme()
    }

    pub fn favorites(&self) -> &[String] {
        self.state.favorites().cities()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn day_night(&self) -> Option<DayNight> {
        self.day_night
    }

    /// The banner message, if one was raised less than three seconds ago.
    pub fn banner(&self) -> Option<&str> {
        self.banner_at(Instant::now())
    }

    pub fn banner_at(&self, now: Instant) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|banner| banner.is_visible_at(now))
            .map(Banner::message)
    }

    fn show(&mut self, snapshot: &WeatherSnapshot) {
        self.renderer.render_card(snapshot, self.state.unit());
        self.day_night = Some(if snapshot.is_night() { DayNight::Night } else { DayNight::Day });

        // Coordinates far from any settlement resolve to a nameless location.
        if snapshot.city_name.trim().is_empty() {
            debug!("not saving a location without a name");
            return;
        }
        self.state.add_favorite(&snapshot.city_name);
    }

    async fn load_forecasts(&mut self, cities: &[String]) {
        let forecasts = join_all(cities.iter().map(|city| self.gateway.fetch_forecast(city))).await;

        let unit = self.state.unit();
        for (city, entries) in cities.iter().zip(forecasts) {
            self.renderer.render_forecast(city, &entries, unit);
        }
    }

    fn city_lookup_failed(&mut self, city: &str, err: &WeatherError) {
        warn!(city, error = %err, "current weather lookup failed");
        self.raise(format!("Could not fetch weather for \"{city}\""));
    }

    fn raise(&mut self, message: impl Into<String>) {
        self.banner = Some(Banner { message: message.into(), raised_at: Instant::now() });
    }
}
