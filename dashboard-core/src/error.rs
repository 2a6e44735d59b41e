use thiserror::Error;

/// Failures of a current-weather lookup.
///
/// Forecast lookups never surface these; they are logged and the forecast
/// region stays empty.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Upstream answered with a non-success status (unknown city, bad coordinates).
    #[error("No weather found for {query} (upstream status {status})")]
    NotFound { query: String, status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected weather payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Missing or inconsistent client configuration (no API key, no proxy URL).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherError {
    /// Short message suitable for the error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::NotFound { .. } => "City not found.",
            WeatherError::Network(_) => "Could not reach the weather service.",
            WeatherError::Decode(_) => "The weather service returned an unexpected response.",
            WeatherError::Config(_) => "The weather service is not configured.",
        }
    }
}

/// Failures of the pass-through proxy, each mapped to the HTTP status it answers with.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Missing city or coordinates")]
    MissingLocation,

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{0}")]
    InvalidUpstreamBody(#[from] serde_json::Error),
}

impl ProxyError {
    pub fn status(&self) -> u16 {
        match self {
            ProxyError::MissingLocation => 400,
            ProxyError::MissingApiKey
            | ProxyError::Upstream(_)
            | ProxyError::InvalidUpstreamBody(_) => 500,
        }
    }
}
