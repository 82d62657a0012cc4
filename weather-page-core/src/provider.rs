use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{Credentials, LocationQuery, ValidationResult, WeatherResult};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// City used to check that a key/endpoint pair is live.
pub const PROBE_CITY: &str = "London";

/// Errors that are not provider-reported failures.
///
/// A provider answering with an error payload is a [`WeatherResult::Failure`],
/// not one of these.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Weather provider returned malformed JSON: {source}; body: {body}")]
    MalformedBody {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Weather provider response has no usable `cod` field; body: {body}")]
    MissingStatus { body: String },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current weather for `location`, normalized into success or provider failure.
    async fn fetch_weather(
        &self,
        location: &LocationQuery,
        credentials: &Credentials,
    ) -> Result<WeatherResult, WeatherError>;

    /// Probe `endpoint` with `key` using [`PROBE_CITY`].
    async fn validate(&self, key: &str, endpoint: &str) -> Result<ValidationResult, WeatherError>;
}
