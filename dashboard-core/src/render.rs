//! View model for the results area: one card per city, each with a forecast
//! strip, plus the page backdrop.
//!
//! Cards are addressed through an explicit `city -> CardId` index, never by
//! searching rendered output.

use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tracing::debug;

use crate::model::{ForecastEntry, TemperatureUnit, WeatherSnapshot};

pub mod animation;
pub mod backdrop;

pub use animation::IconAnimation;
pub use backdrop::{AmbientEffect, Backdrop, ConditionBucket, EffectKind, Gradient, Length, Particle};

/// Round half up, matching how browsers round display values.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Format a Fahrenheit reading in `unit`, rounded to a whole degree after conversion.
pub fn format_temperature(temp_f: f64, unit: TemperatureUnit) -> String {
    let value = match unit {
        TemperatureUnit::Celsius => round_half_up((temp_f - 32.0) * 5.0 / 9.0),
        TemperatureUnit::Fahrenheit => round_half_up(temp_f),
    };
    // Avoid printing "-0".
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.0}{}", unit.suffix())
}

/// A temperature on screen. The Fahrenheit reading is the source of truth;
/// `text` is always derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureLabel {
    fahrenheit: f64,
    text: String,
}

impl TemperatureLabel {
    pub fn new(fahrenheit: f64, unit: TemperatureUnit) -> Self {
        Self {
            fahrenheit,
            text: format_temperature(fahrenheit, unit),
        }
    }

    pub fn reformat(&mut self, unit: TemperatureUnit) {
        self.text = format_temperature(self.fahrenheit, unit);
    }

    pub fn fahrenheit(&self) -> f64 {
        self.fahrenheit
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Fade-and-slide entrance, restarted every time a card is (re)rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    started: Instant,
}

/// Visual state of a transition at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub opacity: f64,
    pub offset_px: f64,
}

impl Transition {
    pub const DELAY: Duration = Duration::from_millis(50);
    pub const DURATION: Duration = Duration::from_millis(500);
    pub const OFFSET_PX: f64 = 20.0;

    pub fn start(now: Instant) -> Self {
        Self { started: now }
    }

    pub fn frame_at(&self, now: Instant) -> TransitionFrame {
        let elapsed = now.saturating_duration_since(self.started);
        let progress = elapsed
            .saturating_sub(Self::DELAY)
            .as_secs_f64()
            / Self::DURATION.as_secs_f64();
        let eased = ease(progress.clamp(0.0, 1.0));

        TransitionFrame {
            opacity: eased,
            offset_px: Self::OFFSET_PX * (1.0 - eased),
        }
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= Self::DELAY + Self::DURATION
    }
}

fn ease(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

/// One day in a card's forecast strip.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTile {
    pub weekday: String,
    pub icon: IconAnimation,
    pub temperature: TemperatureLabel,
}

/// Command emitted by a card's remove control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveCity(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub city: String,
    pub icon: IconAnimation,
    pub temperature: TemperatureLabel,
    pub description: String,
    pub humidity_pct: u8,
    pub forecast: Vec<ForecastTile>,
    pub transition: Transition,
}

impl Card {
    pub fn humidity_label(&self) -> String {
        format!("Humidity: {}%", self.humidity_pct)
    }

    /// What pressing the card's remove control does.
    pub fn remove_control(&self) -> RemoveCity {
        RemoveCity(self.city.clone())
    }

    fn labels_mut(&mut self) -> impl Iterator<Item = &mut TemperatureLabel> {
        std::iter::once(&mut self.temperature)
            .chain(self.forecast.iter_mut().map(|tile| &mut tile.temperature))
    }
}

/// Owns every card on screen and the current backdrop.
#[derive(Debug)]
pub struct Renderer {
    cards: HashMap<CardId, Card>,
    by_city: HashMap<String, CardId>,
    order: Vec<CardId>,
    next_id: u64,
    backdrop: Option<Backdrop>,
    rng: StdRng,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer with a caller-provided particle RNG (seeded in tests).
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            cards: HashMap::new(),
            by_city: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            backdrop: None,
            rng,
        }
    }

    /// Create or update the card for `snapshot.city_name` and switch the backdrop.
    ///
    /// Updating keeps the card's position but clears its forecast strip until
    /// the follow-up forecast render arrives.
    pub fn render_card(&mut self, snapshot: &WeatherSnapshot, unit: TemperatureUnit) -> CardId {
        self.set_backdrop(snapshot.condition_id, snapshot.is_night());

        let id = match self.by_city.get(&snapshot.city_name) {
            Some(id) => *id,
            None => {
                let id = CardId(self.next_id);
                self.next_id += 1;
                self.by_city.insert(snapshot.city_name.clone(), id);
                self.order.push(id);
                id
            }
        };

        debug!(city = %snapshot.city_name, ?id, "rendering card");

        let card = Card {
            id,
            city: snapshot.city_name.clone(),
            icon: IconAnimation::for_icon(&snapshot.icon_code),
            temperature: TemperatureLabel::new(snapshot.temperature_f, unit),
            description: snapshot.condition_description.clone(),
            humidity_pct: snapshot.humidity_pct,
            forecast: Vec::new(),
            transition: Transition::start(Instant::now()),
        };
        self.cards.insert(id, card);
        id
    }

    /// Replace the forecast strip of `city`'s card. Returns false if the card is gone.
    pub fn render_forecast(
        &mut self,
        city: &str,
        entries: &[ForecastEntry],
        unit: TemperatureUnit,
    ) -> bool {
        let Some(card) = self.by_city.get(city).and_then(|id| self.cards.get_mut(id)) else {
            debug!(city, "forecast arrived for a card that is no longer shown");
            return false;
        };

        card.forecast = entries
            .iter()
            .map(|entry| ForecastTile {
                weekday: entry.weekday_label(),
                icon: IconAnimation::for_icon(&entry.icon_code),
                temperature: TemperatureLabel::new(entry.temperature_f, unit),
            })
            .collect();
        true
    }

    pub fn set_backdrop(&mut self, condition_id: u16, is_night: bool) -> &Backdrop {
        self.backdrop
            .insert(Backdrop::for_condition(condition_id, is_night, &mut self.rng))
    }

    pub fn remove_card(&mut self, city: &str) -> Option<Card> {
        let id = self.by_city.remove(city)?;
        self.order.retain(|other| *other != id);
        self.cards.remove(&id)
    }

    /// Empty the results area. The backdrop is left as it is.
    pub fn clear(&mut self) {
        self.cards.clear();
        self.by_city.clear();
        self.order.clear();
    }

    /// Re-derive every temperature label from its stored Fahrenheit reading.
    pub fn reformat_all(&mut self, unit: TemperatureUnit) {
        for card in self.cards.values_mut() {
            for label in card.labels_mut() {
                label.reformat(unit);
            }
        }
    }

    pub fn card(&self, city: &str) -> Option<&Card> {
        self.by_city.get(city).and_then(|id| self.cards.get(id))
    }

    /// Cards in the order they first appeared.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn backdrop(&self) -> Option<&Backdrop> {
        self.backdrop.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(city: &str, temp_f: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            city_name: city.into(),
            temperature_f: temp_f,
            humidity_pct: 55,
            condition_id: 800,
            condition_description: "clear sky".into(),
            icon_code: "01d".into(),
            timestamp: 1_500,
            sunrise: 1_000,
            sunset: 2_000,
        }
    }

    fn forecast(temps: &[f64]) -> Vec<ForecastEntry> {
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| ForecastEntry {
                timestamp: 0,
                date: NaiveDate::from_ymd_opt(2024, 3, 4 + i as u32).unwrap(),
                temperature_f: *t,
                icon_code: "10d".into(),
            })
            .collect()
    }

    fn renderer() -> Renderer {
        Renderer::with_rng(StdRng::seed_from_u64(1))
    }

    #[test]
    fn formats_reference_temperatures() {
        assert_eq!(format_temperature(32.0, TemperatureUnit::Celsius), "0°C");
        assert_eq!(format_temperature(32.0, TemperatureUnit::Fahrenheit), "32°F");
        assert_eq!(format_temperature(98.6, TemperatureUnit::Celsius), "37°C");
    }

    #[test]
    fn rounds_after_conversion() {
        // 34.5°F is 1.39°C. Rounding to 35°F first would give 1.67°C -> "2°C".
        assert_eq!(format_temperature(34.5, TemperatureUnit::Celsius), "1°C");
        assert_eq!(format_temperature(34.4, TemperatureUnit::Celsius), "1°C");
    }

    #[test]
    fn halves_round_up_and_negative_zero_is_hidden() {
        assert_eq!(format_temperature(-2.5, TemperatureUnit::Fahrenheit), "-2°F");
        assert_eq!(format_temperature(31.5, TemperatureUnit::Celsius), "0°C");
        assert_eq!(format_temperature(-0.4, TemperatureUnit::Fahrenheit), "0°F");
    }

    #[test]
    fn rerendering_a_city_updates_in_place() {
        let mut r = renderer();
        let first = r.render_card(&snapshot("Paris", 60.0), TemperatureUnit::Fahrenheit);
        r.render_card(&snapshot("Rome", 70.0), TemperatureUnit::Fahrenheit);
        let again = r.render_card(&snapshot("Paris", 65.0), TemperatureUnit::Fahrenheit);

        assert_eq!(first, again);
        assert_eq!(r.len(), 2);
        let cities: Vec<_> = r.cards().map(|c| c.city.as_str()).collect();
        assert_eq!(cities, ["Paris", "Rome"]);
        assert_eq!(r.card("Paris").unwrap().temperature.text(), "65°F");
    }

    #[test]
    fn forecast_fills_tiles_for_known_cards_only() {
        let mut r = renderer();
        r.render_card(&snapshot("Paris", 60.0), TemperatureUnit::Celsius);

        assert!(r.render_forecast("Paris", &forecast(&[50.0, 59.0]), TemperatureUnit::Celsius));
        assert!(!r.render_forecast("Lima", &forecast(&[50.0]), TemperatureUnit::Celsius));

        let tiles = &r.card("Paris").unwrap().forecast;
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].weekday, "Mon");
        assert_eq!(tiles[0].temperature.text(), "10°C");
        assert_eq!(tiles[1].icon.asset, "Weather-rain.json");
    }

    #[test]
    fn toggling_unit_twice_restores_every_label() {
        let mut r = renderer();
        r.render_card(&snapshot("Paris", 61.3), TemperatureUnit::Celsius);
        r.render_card(&snapshot("Oslo", 27.9), TemperatureUnit::Celsius);
        r.render_forecast("Oslo", &forecast(&[30.1, 33.3, 40.5]), TemperatureUnit::Celsius);

        let labels = |r: &Renderer| -> Vec<String> {
            r.cards()
                .flat_map(|c| {
                    std::iter::once(c.temperature.text().to_string())
                        .chain(c.forecast.iter().map(|t| t.temperature.text().to_string()))
                })
                .collect()
        };
        let before = labels(&r);

        r.reformat_all(TemperatureUnit::Fahrenheit);
        assert_eq!(r.card("Paris").unwrap().temperature.text(), "61°F");
        r.reformat_all(TemperatureUnit::Celsius);

        assert_eq!(labels(&r), before);
    }

    #[test]
    fn removing_and_clearing_cards() {
        let mut r = renderer();
        r.render_card(&snapshot("Paris", 60.0), TemperatureUnit::Celsius);
        r.render_card(&snapshot("Rome", 60.0), TemperatureUnit::Celsius);

        assert_eq!(r.remove_card("Paris").map(|c| c.city), Some("Paris".to_string()));
        assert!(r.remove_card("Paris").is_none());
        assert_eq!(r.len(), 1);

        r.clear();
        assert!(r.is_empty());
        assert!(r.backdrop().is_some());
    }

    #[test]
    fn card_render_sets_backdrop_from_condition() {
        let mut r = renderer();
        let mut night = snapshot("Reykjavik", 20.0);
        night.timestamp = 5_000;
        r.render_card(&night, TemperatureUnit::Celsius);

        let backdrop = r.backdrop().unwrap();
        assert!(backdrop.is_night);
        assert_eq!(backdrop.effect.kind, EffectKind::Stars);
        assert_eq!(backdrop.effect.particles.len(), 50);
    }

    #[test]
    fn entrance_transition_runs_to_completion() {
        let start = Instant::now();
        let t = Transition::start(start);

        let first = t.frame_at(start);
        assert_eq!(first.opacity, 0.0);
        assert_eq!(first.offset_px, Transition::OFFSET_PX);

        let end = start + Transition::DELAY + Transition::DURATION;
        assert!(t.is_complete(end));
        let last = t.frame_at(end);
        assert_eq!(last.opacity, 1.0);
        assert_eq!(last.offset_px, 0.0);
    }
}
