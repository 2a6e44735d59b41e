//! Stateless pass-through endpoint that keeps the API key off the client.
//!
//! Accepts `city` or `lat`+`lon` (plus `forecast=true` for a city forecast),
//! forwards to OpenWeather with imperial units and relays the JSON body.

use reqwest::Client;
use serde::Deserialize;
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use warp::{Filter, Rejection, Reply, http::StatusCode};

use crate::{config::DEFAULT_BASE_URL, error::ProxyError};

/// Raw query string parameters, all optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyQuery {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub forecast: Option<String>,
}

/// Which upstream resource a request maps to.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamTarget {
    Forecast { city: String },
    CurrentByCity { city: String },
    CurrentByCoordinates { lat: f64, lon: f64 },
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ProxyQuery {
    /// A city wins over coordinates. Coordinates must both parse as numbers.
    pub fn target(&self) -> Result<UpstreamTarget, ProxyError> {
        let wants_forecast = non_empty(&self.forecast) == Some("true");

        if let Some(city) = non_empty(&self.city) {
            let city = city.to_string();
            return Ok(if wants_forecast {
                UpstreamTarget::Forecast { city }
            } else {
                UpstreamTarget::CurrentByCity { city }
            });
        }

        let lat = non_empty(&self.lat).and_then(|v| v.parse::<f64>().ok());
        let lon = non_empty(&self.lon).and_then(|v| v.parse::<f64>().ok());
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(UpstreamTarget::CurrentByCoordinates { lat, lon }),
            _ => Err(ProxyError::MissingLocation),
        }
    }
}

/// What the proxy answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyReply {
    pub status: u16,
    pub json: bool,
    pub body: String,
}

impl ProxyReply {
    fn from_error(err: &ProxyError) -> Self {
        match err {
            ProxyError::MissingApiKey | ProxyError::MissingLocation => Self {
                status: err.status(),
                json: false,
                body: err.to_string(),
            },
            ProxyError::Upstream(_) | ProxyError::InvalidUpstreamBody(_) => Self {
                status: err.status(),
                json: true,
                body: serde_json::json!({ "error": err.to_string() }).to_string(),
            },
        }
    }

    pub fn into_response(self) -> warp::reply::Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let reply = warp::reply::with_status(self.body, status);
        if self.json {
            warp::reply::with_header(reply, "content-type", "application/json").into_response()
        } else {
            reply.into_response()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Proxy {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl Proxy {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Read the key from `OPENWEATHER_KEY`, the only place the proxy looks for it.
    pub fn from_env() -> Self {
        Self::new(std::env::var(crate::config::API_KEY_ENV).ok(), DEFAULT_BASE_URL)
    }

    pub async fn handle(&self, query: ProxyQuery) -> ProxyReply {
        match self.forward(&query).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, status = err.status(), "proxy request failed");
                ProxyReply::from_error(&err)
            }
        }
    }

    async fn forward(&self, query: &ProxyQuery) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key.as_deref().ok_or(ProxyError::MissingApiKey)?;
        let target = query.target()?;
        info!(?target, "forwarding weather request");

        let base = self.base_url.trim_end_matches('/');
        let req = match &target {
            UpstreamTarget::Forecast { city } => self
                .http
                .get(format!("{base}/data/2.5/forecast"))
                .query(&[("q", city.as_str())]),
            UpstreamTarget::CurrentByCity { city } => self
                .http
                .get(format!("{base}/data/2.5/weather"))
                .query(&[("q", city.as_str())]),
            UpstreamTarget::CurrentByCoordinates { lat, lon } => self
                .http
                .get(format!("{base}/data/2.5/weather"))
                .query(&[("lat", lat.to_string()), ("lon", lon.to_string())]),
        };

        let res = req
            .query(&[("appid", api_key), ("units", "imperial")])
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        // Relay the payload as-is, but only if it really is JSON.
        serde_json::from_str::<serde_json::Value>(&body)?;

        Ok(ProxyReply {
            status: if status.is_success() { 200 } else { status.as_u16() },
            json: true,
            body,
        })
    }
}

/// `GET /` and `GET /.netlify/functions/weather`, both served by `proxy`.
pub fn routes(proxy: Arc<Proxy>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let path = warp::path::end()
        .or(warp::path!(".netlify" / "functions" / "weather"))
        .unify();

    warp::get()
        .and(path)
        .and(warp::query::<ProxyQuery>())
        .and(warp::any().map(move || proxy.clone()))
        .and_then(handle_request)
}

async fn handle_request(
    query: ProxyQuery,
    proxy: Arc<Proxy>,
) -> Result<warp::reply::Response, Infallible> {
    Ok(proxy.handle(query).await.into_response())
}

/// Serve the proxy until the process is stopped.
pub async fn serve(proxy: Proxy, addr: SocketAddr) {
    info!(%addr, "weather proxy listening");
    warp::serve(routes(Arc::new(proxy))).run(addr).await;
}
