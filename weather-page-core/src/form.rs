//! Validation of unsaved settings before they are stored.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::{
    config::Settings,
    model::WeatherResult,
    page::capitalize_first,
    provider::{WeatherError, WeatherProvider},
};

/// Form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Api,
    ApiKey,
    ApiEndpoint,
    Location,
    City,
    CountryCode,
    Units,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Api => "api",
            FormField::ApiKey => "api.key",
            FormField::ApiEndpoint => "api.endpoint",
            FormField::Location => "location",
            FormField::City => "location.city",
            FormField::CountryCode => "location.country_code",
            FormField::Units => "other.units",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `form` against the provider. An empty list means
/// [`Settings::normalized`] can be saved.
///
/// Required fields are checked first; the provider is only contacted when
/// all of them are filled in. Credentials are probed, then the unsaved
/// location is looked up with the unsaved credentials.
pub async fn validate_settings(
    provider: &dyn WeatherProvider,
    form: &Settings,
) -> Result<Vec<FieldError>, WeatherError> {
    let mut errors = required_field_errors(form);
    if !form.other.units.is_selectable() {
        errors.push(FieldError::new(
            FormField::Units,
            format!("Units must be one of metric, standard or imperial, got '{}'.", form.other.units),
        ));
    }
    if !errors.is_empty() {
        return Ok(errors);
    }

    // Same normalization the pages apply to stored settings.
    let credentials = form.credentials();

    let probe = match provider.validate(&credentials.key, &credentials.endpoint).await {
        Ok(probe) => probe,
        Err(err @ WeatherError::InvalidEndpoint { .. }) => {
            errors.push(FieldError::new(FormField::Api, err.to_string()));
            return Ok(errors);
        }
        Err(err) => return Err(err),
    };
    if !probe.is_accepted() {
        debug!(status_code = probe.status_code, "Credentials rejected");
        errors.push(FieldError::new(FormField::Api, probe.message.unwrap_or_default()));
    }

    let location = form.location_query();
    if let WeatherResult::Failure(failure) = provider.fetch_weather(&location, &credentials).await? {
        debug!(status_code = failure.status_code, "Location rejected");
        errors.push(FieldError::new(FormField::Location, capitalize_first(&failure.message)));
    }

    Ok(errors)
}

fn required_field_errors(form: &Settings) -> Vec<FieldError> {
    [
        (FormField::ApiKey, &form.api.key, "Key"),
        (FormField::ApiEndpoint, &form.api.endpoint, "Endpoint"),
        (FormField::City, &form.location.city, "City"),
        (FormField::CountryCode, &form.location.country_code, "Country code"),
    ]
    .into_iter()
    .filter(|(_, value, _)| value.trim().is_empty())
    .map(|(field, _, label)| FieldError::new(field, format!("{label} field is required.")))
    .collect()
}
