use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::model::{
    Credentials, LocationQuery, ProviderFailure, ValidationResult, WeatherReport, WeatherResult,
};

use super::{PROBE_CITY, WeatherError, WeatherProvider};

/// HTTP client for the OpenWeatherMap current-weather endpoint.
///
/// Holds no credentials or location; both are passed per call.
#[derive(Debug, Clone, Default)]
pub struct OpenWeatherClient {
    http: Client,
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    /// Use a preconfigured `reqwest` client (proxy, TLS, timeouts).
    pub fn with_http_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip_all, fields(q = %location.q()))]
    async fn fetch_weather(
        &self,
        location: &LocationQuery,
        credentials: &Credentials,
    ) -> Result<WeatherResult, WeatherError> {
        let request = self.weather_request(location, credentials)?;
        debug!(
            endpoint = %credentials.endpoint,
            units = ?location.units,
            "Requesting current weather"
        );

        let res = request.send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(%status, "Provider answered with an error status");
        }

        // Error statuses carry the same `cod`/`message` envelope as the body.
        let result = decode_weather(&body)?;
        if let WeatherResult::Failure(failure) = &result {
            warn!(
                status_code = failure.status_code,
                message = %failure.message,
                "Weather lookup rejected by provider"
            );
        }

        Ok(result)
    }

    #[instrument(skip_all, fields(endpoint = %endpoint))]
    async fn validate(&self, key: &str, endpoint: &str) -> Result<ValidationResult, WeatherError> {
        let request = self.probe_request(key, endpoint)?;
        debug!(probe = PROBE_CITY, "Probing provider credentials");

        let res = request.send().await?;
        let status = res.status();

        if status.is_success() {
            return Ok(ValidationResult { status_code: status.as_u16(), message: None });
        }

        let body = res.text().await?;
        let failure = decode_failure(&body)?;
        warn!(
            %status,
            status_code = failure.status_code,
            "Provider rejected credentials"
        );

        Ok(ValidationResult { status_code: failure.status_code, message: Some(failure.message) })
    }
}

impl OpenWeatherClient {
    /// `GET {endpoint}?q={city},{country}&appid={key}[&units={units}]`
    fn weather_request(
        &self,
        location: &LocationQuery,
        credentials: &Credentials,
    ) -> Result<RequestBuilder, WeatherError> {
        let url = parse_endpoint(&credentials.endpoint)?;

        let mut query = vec![("q", location.q()), ("appid", credentials.key.clone())];
        if let Some(units) = &location.units {
            query.push(("units", units.as_str().to_string()));
        }

        Ok(self.http.get(url).query(&query))
    }

    /// `GET {endpoint}?q=London&appid={key}`
    fn probe_request(&self, key: &str, endpoint: &str) -> Result<RequestBuilder, WeatherError> {
        let url = parse_endpoint(endpoint)?;
        Ok(self.http.get(url).query(&[("q", PROBE_CITY), ("appid", key)]))
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, WeatherError> {
    Url::parse(endpoint.trim()).map_err(|e| WeatherError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Turn a provider body into a success or a provider failure, based on `cod`.
pub fn decode_weather(body: &str) -> Result<WeatherResult, WeatherError> {
    let value = parse_body(body)?;
    let status_code = status_code(&value)
        .ok_or_else(|| WeatherError::MissingStatus { body: truncate_body(body) })?;

    if status_code != 200 {
        return Ok(WeatherResult::Failure(ProviderFailure {
            status_code,
            message: message(&value),
        }));
    }

    let report: WeatherReport = serde_json::from_value(value).map_err(|source| {
        WeatherError::MalformedBody { body: truncate_body(body), source }
    })?;

    Ok(WeatherResult::Success(report))
}

fn decode_failure(body: &str) -> Result<ProviderFailure, WeatherError> {
    let value = parse_body(body)?;
    let status_code = status_code(&value)
        .ok_or_else(|| WeatherError::MissingStatus { body: truncate_body(body) })?;

    Ok(ProviderFailure { status_code, message: message(&value) })
}

fn parse_body(body: &str) -> Result<Value, WeatherError> {
    serde_json::from_str(body)
        .map_err(|source| WeatherError::MalformedBody { body: truncate_body(body), source })
}

/// `cod` is a number on success and on some errors, a string on others (`"404"`).
fn status_code(value: &Value) -> Option<u16> {
    match value.get("cod")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn message(value: &Value) -> String {
    value.get("message").and_then(Value::as_str).unwrap_or_default().to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
