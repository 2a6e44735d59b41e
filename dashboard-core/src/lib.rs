//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Persistence of favorites and preferences
//! - The weather gateway (direct OpenWeather access or via the proxy)
//! - The rendering model: cards, forecast tiles, backdrop effects
//! - The favorites controller and the app controller that wires them together
//! - The pass-through proxy server
//!
//! It is used by `weather-dash`, but carries no terminal or browser code itself.

pub mod app;
pub mod config;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod model;
pub mod proxy;
pub mod render;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

pub use app::{App, Banner, DayNight, LocationFailure};
pub use config::{Config, GatewayMode};
pub use error::{ProxyError, WeatherError};
pub use favorites::{FavoriteTag, Favorites, TagCommand, TagTarget};
pub use gateway::{Endpoint, OpenWeatherGateway, WeatherGateway, gateway_from_config};
pub use model::{ForecastEntry, LocationQuery, Preferences, TemperatureUnit, Theme, WeatherSnapshot};
pub use render::{Card, Renderer, format_temperature};
pub use state::AppState;
pub use store::{FileStore, KeyValueStore, MemoryStore, PersistenceStore};
