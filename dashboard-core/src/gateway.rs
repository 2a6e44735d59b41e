use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::{ForecastEntry, WeatherSnapshot},
};

pub mod openweather;

pub use openweather::OpenWeatherGateway;

/// Where weather requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// OpenWeather itself; `base_url` is the scheme and host, e.g. `https://api.openweathermap.org`.
    Direct { api_key: String, base_url: String },
    /// A same-origin pass-through proxy that appends the key server-side.
    Proxy { url: String },
}

/// Source of current conditions and forecasts.
///
/// All calls are single-shot: no retry, no timeout beyond the transport default.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn fetch_current_by_name(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;

    async fn fetch_current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError>;

    /// Up to five noon entries, one per day. Failures are logged and yield an empty list.
    async fn fetch_forecast(&self, city: &str) -> Vec<ForecastEntry>;
}

/// Construct the gateway described by the config.
pub fn gateway_from_config(config: &Config) -> Result<Box<dyn WeatherGateway>, WeatherError> {
    let endpoint = config.endpoint()?;
    Ok(Box::new(OpenWeatherGateway::new(endpoint)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayMode;

    #[test]
    fn proxy_config_builds_a_gateway_without_a_key() {
        let cfg = Config {
            mode: GatewayMode::Proxy,
            proxy_url: Some("http://127.0.0.1:8888/".into()),
            ..Config::default()
        };

        assert!(gateway_from_config(&cfg).is_ok());
    }

    #[test]
    fn proxy_config_without_url_is_a_config_error() {
        let cfg = Config { mode: GatewayMode::Proxy, ..Config::default() };
        let err = gateway_from_config(&cfg).unwrap_err();

        assert!(matches!(err, WeatherError::Config(_)));
    }
}
