use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where to look up current weather.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => write!(f, "\"{name}\""),
            LocationQuery::Coordinates { lat, lon } => write!(f, "({lat}, {lon})"),
        }
    }
}

/// A single point-in-time weather reading for a location.
///
/// Temperatures are always kept in Fahrenheit (the upstream is queried with
/// imperial units); conversion happens only when a label is formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub temperature_f: f64,
    pub humidity_pct: u8,
    pub condition_id: u16,
    pub condition_description: String,
    pub icon_code: String,
    pub timestamp: i64,
    pub sunrise: i64,
    pub sunset: i64,
}

impl WeatherSnapshot {
    pub fn is_night(&self) -> bool {
        self.timestamp < self.sunrise || self.timestamp > self.sunset
    }
}

/// One day of the 5-day forecast strip (the noon slot of that day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: i64,
    pub date: NaiveDate,
    pub temperature_f: f64,
    pub icon_code: String,
}

impl ForecastEntry {
    /// Short weekday name, e.g. "Mon".
    pub fn weekday_label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Anything other than "dark" falls back to the light theme.
    pub fn parse_lenient(value: &str) -> Self {
        if value == "dark" { Theme::Dark } else { Theme::Light }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_use_celsius(use_celsius: bool) -> Self {
        if use_celsius {
            TemperatureUnit::Celsius
        } else {
            TemperatureUnit::Fahrenheit
        }
    }

    pub fn use_celsius(&self) -> bool {
        matches!(self, TemperatureUnit::Celsius)
    }

    pub fn toggled(self) -> Self {
        Self::from_use_celsius(!self.use_celsius())
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Caption of the unit toggle control, current unit first.
    pub fn toggle_caption(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C / °F",
            TemperatureUnit::Fahrenheit => "°F / °C",
        }
    }
}

/// User preferences, each persisted under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub unit: TemperatureUnit,
}
