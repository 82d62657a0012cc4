//! Core library for the weather page.
//!
//! This crate defines:
//! - Settings storage (credentials, default location, display preferences)
//! - The OpenWeatherMap client and credential probe
//! - Validation of unsaved settings
//! - The display model and the default/per-city page handlers
//!
//! It is used by `weather-page-cli`, but can be embedded in any host that
//! renders [`DisplayModel`] through its own templates.

pub mod config;
pub mod form;
pub mod model;
pub mod page;
pub mod presenter;
pub mod provider;

pub use config::{Settings, SettingsStore};
pub use form::{FieldError, FormField, validate_settings};
pub use model::{
    Credentials, DateFormat, LocationQuery, ProviderFailure, Units, ValidationResult,
    WeatherReport, WeatherResult,
};
pub use page::{PageError, WeatherPage};
pub use presenter::{DisplayModel, PresentError, present};
pub use provider::{OpenWeatherClient, WeatherError, WeatherProvider};
