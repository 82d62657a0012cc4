//! Default-location and per-city weather pages.

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::SettingsStore,
    model::{LocationQuery, WeatherResult},
    presenter::{DisplayModel, PresentError, present},
    provider::{WeatherError, WeatherProvider},
};

#[derive(Debug, Error)]
pub enum PageError {
    /// Settings are incomplete for the requested page.
    #[error("Access denied: {0}")]
    AccessDenied(&'static str),

    /// The provider could not resolve the location.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Present(#[from] PresentError),
}

/// Renders weather pages from the stored settings.
#[derive(Debug)]
pub struct WeatherPage<'a, S: SettingsStore + ?Sized> {
    provider: &'a dyn WeatherProvider,
    store: &'a S,
}

impl<'a, S: SettingsStore + ?Sized> WeatherPage<'a, S> {
    pub fn new(provider: &'a dyn WeatherProvider, store: &'a S) -> Self {
        Self { provider, store }
    }

    /// Weather for the configured location. Cache tags from the store are attached.
    pub async fn render_default(&self) -> Result<DisplayModel, PageError> {
        let settings = self.store.settings();
        if !settings.is_api_configured() {
            return Err(PageError::AccessDenied("API credentials are not configured"));
        }
        if !settings.is_location_configured() {
            return Err(PageError::AccessDenied("default location is not configured"));
        }

        let tags = self.store.cache_tags();
        let cache_tags = (!tags.is_empty()).then_some(tags);

        self.render(settings.location_query(), cache_tags).await
    }

    /// Weather for `city`. Never cached by settings-derived tags.
    pub async fn render_for_city(&self, city: &str) -> Result<DisplayModel, PageError> {
        let settings = self.store.settings();
        if !settings.is_api_configured() {
            return Err(PageError::AccessDenied("API credentials are not configured"));
        }

        let location =
            LocationQuery::city(city).with_units(Some(settings.other.units.clone()));

        self.render(location, None).await
    }

    async fn render(
        &self,
        location: LocationQuery,
        cache_tags: Option<Vec<String>>,
    ) -> Result<DisplayModel, PageError> {
        let settings = self.store.settings();
        let credentials = settings.credentials();

        match self.provider.fetch_weather(&location, &credentials).await? {
            WeatherResult::Success(report) => {
                debug!(city = %report.name, "Rendering weather page");
                Ok(present(
                    report,
                    settings.other.units.clone(),
                    settings.other.date_format,
                    cache_tags,
                )?)
            }
            WeatherResult::Failure(failure) => {
                info!(
                    q = %location.q(),
                    status_code = failure.status_code,
                    "Weather page not found"
                );
                Err(PageError::NotFound(capitalize_first(&failure.message)))
            }
        }
    }
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize_first(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_only_touches_first_char() {
        assert_eq!(capitalize_first("city not found"), "City not found");
        assert_eq!(capitalize_first("Invalid API key"), "Invalid API key");
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");
    }
}
