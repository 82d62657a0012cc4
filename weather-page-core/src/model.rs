use serde::{Deserialize, Serialize};
use std::fmt;

/// API credentials for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub endpoint: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { key: key.into(), endpoint: endpoint.into() }
    }
}

/// Measurement units understood by the provider.
///
/// Only the three named variants can be selected in the settings form. Any
/// other value is forwarded to the provider as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Units {
    #[default]
    Metric,
    Standard,
    Imperial,
    Other(String),
}

impl Units {
    pub fn as_str(&self) -> &str {
        match self {
            Units::Metric => "metric",
            Units::Standard => "standard",
            Units::Imperial => "imperial",
            Units::Other(raw) => raw,
        }
    }

    /// Values offered by the settings form.
    pub const fn selectable() -> &'static [Units] {
        SELECTABLE_UNITS
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, Units::Other(_))
    }

    /// Label used next to temperatures.
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard | Units::Other(_) => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            _ => "m/s",
        }
    }
}

impl From<String> for Units {
    fn from(value: String) -> Self {
        match value.as_str() {
            "metric" => Units::Metric,
            "standard" => Units::Standard,
            "imperial" => Units::Imperial,
            _ => Units::Other(value),
        }
    }
}

impl From<&str> for Units {
    fn from(value: &str) -> Self {
        Units::from(value.to_string())
    }
}

impl From<Units> for String {
    fn from(value: Units) -> Self {
        match value {
            Units::Other(raw) => raw,
            named => named.as_str().to_string(),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SELECTABLE_UNITS: &[Units] = &[Units::Metric, Units::Standard, Units::Imperial];

/// Where to look the weather up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub city: String,
    /// ISO 3166 alpha-2 code, empty when unknown.
    pub country_code: String,
    pub units: Option<Units>,
}

impl LocationQuery {
    pub fn city(city: impl Into<String>) -> Self {
        Self { city: city.into(), country_code: String::new(), units: None }
    }

    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    pub fn with_units(mut self, units: Option<Units>) -> Self {
        self.units = units;
        self
    }

    /// Value of the provider's `q` parameter. The comma is kept even when
    /// the country code is empty.
    pub fn q(&self) -> String {
        format!("{},{}", self.city, self.country_code)
    }

    /// Inverse of [`LocationQuery::q`]. Splits on the last comma.
    #[cfg(test)]
    pub(crate) fn parse_q(q: &str) -> Option<(String, String)> {
        q.rsplit_once(',').map(|(city, cc)| (city.to_string(), cc.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MainMetrics {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grnd_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Clouds {
    #[serde(default)]
    pub all: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
}

/// One entry of the provider's `weather` array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: u32,
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

/// Successful current-weather payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub clouds: Clouds,
    #[serde(default)]
    pub coord: Coordinates,
    pub dt: i64,
    pub main: MainMetrics,
    pub name: String,
    #[serde(default)]
    pub sys: Sys,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub visibility: Option<u32>,
    #[serde(default)]
    pub wind: Wind,
    /// Ordered as the provider sent them; the first entry is the primary one.
    pub weather: Vec<Condition>,
}

/// Error payload reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub status_code: u16,
    pub message: String,
}

/// Normalized outcome of a weather lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    Success(WeatherReport),
    Failure(ProviderFailure),
}

impl WeatherResult {
    pub fn is_success(&self) -> bool {
        matches!(self, WeatherResult::Success(_))
    }

    /// Provider status code, `200` for a success.
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherResult::Success(_) => 200,
            WeatherResult::Failure(failure) => failure.status_code,
        }
    }
}

/// Outcome of a credential probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub status_code: u16,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn is_accepted(&self) -> bool {
        self.status_code == 200
    }
}

/// Selectable date formats, stored as their pattern (`Y-m-d H:i`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "D, F j, H:i")]
    DayMonthTime,
    #[serde(rename = "Y-m-d H:i")]
    Iso,
    #[serde(rename = "F j, Y, g:i a")]
    MonthDayYear12h,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::DayMonthTime => "D, F j, H:i",
            DateFormat::Iso => "Y-m-d H:i",
            DateFormat::MonthDayYear12h => "F j, Y, g:i a",
        }
    }

    /// Equivalent `chrono` format string.
    pub fn chrono_format(&self) -> &'static str {
        match self {
            DateFormat::DayMonthTime => "%a, %B %-d, %H:%M",
            DateFormat::Iso => "%Y-%m-%d %H:%M",
            DateFormat::MonthDayYear12h => "%B %-d, %Y, %-I:%M %P",
        }
    }

    pub const fn all() -> &'static [DateFormat] {
        &[DateFormat::DayMonthTime, DateFormat::Iso, DateFormat::MonthDayYear12h]
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DateFormat {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        DateFormat::all()
            .iter()
            .copied()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| anyhow::anyhow!("Unknown date format '{value}'."))
    }
}
