use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{ForecastEntry, LocationQuery, WeatherSnapshot},
};

use super::{Endpoint, WeatherGateway};

const MAX_FORECAST_DAYS: usize = 5;
const FALLBACK_ICON: &str = "01d";
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy)]
enum Resource {
    Current,
    Forecast,
}

impl Resource {
    fn path(&self) -> &'static str {
        match self {
            Resource::Current => "weather",
            Resource::Forecast => "forecast",
        }
    }
}

/// OpenWeather 2.5 client, talking either to the API or to the pass-through proxy.
#[derive(Debug, Clone)]
pub struct OpenWeatherGateway {
    endpoint: Endpoint,
    http: Client,
}

impl OpenWeatherGateway {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn request(&self, resource: Resource, query: &LocationQuery) -> RequestBuilder {
        match &self.endpoint {
            Endpoint::Direct { api_key, base_url } => {
                let url = format!("{}/data/2.5/{}", base_url.trim_end_matches('/'), resource.path());
                self.http
                    .get(url)
                    .query(&location_params(query, "q"))
                    .query(&[("appid", api_key.as_str()), ("units", "imperial")])
            }
            Endpoint::Proxy { url } => {
                let req = self.http.get(url).query(&location_params(query, "city"));
                match resource {
                    Resource::Forecast => req.query(&[("forecast", "true")]),
                    Resource::Current => req,
                }
            }
        }
    }

    async fn fetch_current(&self, query: &LocationQuery) -> Result<WeatherSnapshot, WeatherError> {
        debug!(%query, "fetching current weather");

        let res = self.request(Resource::Current, query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(%query, %status, body = %truncate_body(&body), "current weather lookup rejected");
            return Err(WeatherError::NotFound {
                query: query.to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_snapshot())
    }

    async fn try_fetch_forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, WeatherError> {
        let query = LocationQuery::City(city.to_string());
        debug!(%query, "fetching forecast");

        let res = self.request(Resource::Forecast, &query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::NotFound {
                query: query.to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        Ok(noon_entries(parsed.list))
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn fetch_current_by_name(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(&LocationQuery::City(city.to_string())).await
    }

    async fn fetch_current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(&LocationQuery::Coordinates { lat, lon }).await
    }

    async fn fetch_forecast(&self, city: &str) -> Vec<ForecastEntry> {
        match self.try_fetch_forecast(city).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(city, error = %err, "error fetching forecast");
                Vec::new()
            }
        }
    }
}

fn location_params(query: &LocationQuery, city_param: &'static str) -> Vec<(&'static str, String)> {
    match query {
        LocationQuery::City(name) => vec![(city_param, name.clone())],
        LocationQuery::Coordinates { lat, lon } => {
            vec![("lat", lat.to_string()), ("lon", lon.to_string())]
        }
    }
}

/// Keep the slots whose time of day is exactly noon, at most one per day for five days.
fn noon_entries(list: Vec<OwForecastEntry>) -> Vec<ForecastEntry> {
    list.into_iter()
        .filter_map(|entry| {
            let slot = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT).ok()?;
            let time = slot.time();
            if (time.hour(), time.minute(), time.second()) != (12, 0, 0) {
                return None;
            }

            let icon_code = entry
                .weather
                .first()
                .map(|w| w.icon.clone())
                .unwrap_or_else(|| FALLBACK_ICON.to_string());

            Some(ForecastEntry {
                timestamp: entry.dt,
                date: slot.date(),
                temperature_f: entry.main.temp,
                icon_code,
            })
        })
        .take(MAX_FORECAST_DAYS)
        .collect()
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    id: u16,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let (condition_id, condition_description, icon_code) = match self.weather.into_iter().next()
        {
            Some(w) => (w.id, w.description, w.icon),
            None => (0, "Unknown".to_string(), FALLBACK_ICON.to_string()),
        };

        WeatherSnapshot {
            city_name: self.name,
            temperature_f: self.main.temp,
            humidity_pct: self.main.humidity,
            condition_id,
            condition_description,
            icon_code,
            timestamp: self.dt,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}
