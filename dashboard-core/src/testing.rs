//! In-memory gateway for unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    error::WeatherError,
    gateway::WeatherGateway,
    model::{ForecastEntry, WeatherSnapshot},
};

pub fn snapshot(city: &str, temp_f: f64, condition_id: u16) -> WeatherSnapshot {
    WeatherSnapshot {
        city_name: city.to_string(),
        temperature_f: temp_f,
        humidity_pct: 60,
        condition_id,
        condition_description: "clear sky".to_string(),
        icon_code: "01d".to_string(),
        timestamp: 1_500,
        sunrise: 1_000,
        sunset: 2_000,
    }
}

/// Answers from a fixed table keyed by lowercase query; unknown cities are `NotFound`.
#[derive(Debug, Default, Clone)]
pub struct FakeGateway {
    by_name: HashMap<String, WeatherSnapshot>,
    by_coordinates: Option<WeatherSnapshot>,
    forecast_days: usize,
    pub current_calls: Arc<AtomicUsize>,
    pub forecast_calls: Arc<AtomicUsize>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self { forecast_days: 5, ..Self::default() }
    }

    pub fn with_city(mut self, query: &str, snapshot: WeatherSnapshot) -> Self {
        self.by_name.insert(query.to_lowercase(), snapshot);
        self
    }

    pub fn with_coordinates(mut self, snapshot: WeatherSnapshot) -> Self {
        self.by_coordinates = Some(snapshot);
        self
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherGateway for FakeGateway {
    async fn fetch_current_by_name(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.by_name
            .get(&city.to_lowercase())
            .cloned()
            .ok_or_else(|| WeatherError::NotFound { query: city.to_string(), status: 404 })
    }

    async fn fetch_current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.by_coordinates
            .clone()
            .ok_or_else(|| WeatherError::NotFound { query: format!("({lat}, {lon})"), status: 400 })
    }

    async fn fetch_forecast(&self, city: &str) -> Vec<ForecastEntry> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if !self.by_name.values().any(|s| s.city_name == city) {
            return Vec::new();
        }
        (0..self.forecast_days)
            .filter_map(|day| {
                let date = NaiveDate::from_ymd_opt(2024, 3, 4 + day as u32)?;
                Some(ForecastEntry {
                    timestamp: 0,
                    date,
                    temperature_f: 50.0 + day as f64,
                    icon_code: "10d".to_string(),
                })
            })
            .collect()
    }
}
