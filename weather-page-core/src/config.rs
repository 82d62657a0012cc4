use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::{Credentials, DateFormat, LocationQuery, Units};

/// Name of the settings object. Cache tags are derived from it.
pub const SETTINGS_NAME: &str = "weather.settings";

/// Provider credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub endpoint: String,
}

/// Default location shown on the weather page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSettings {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_code: String,
}

/// Display preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSettings {
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub date_format: DateFormat,
}

/// Top-level settings stored on disk.
///
/// Example TOML:
/// ```toml
/// [api]
/// key = "..."
/// endpoint = "https://api.openweathermap.org/data/2.5/weather"
///
/// [location]
/// city = "Kyiv"
/// country_code = "UA"
///
/// [other]
/// units = "metric"
/// date_format = "D, F j, H:i"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub other: OtherSettings,
}

/// Read side of the settings, as seen by the page handler.
pub trait SettingsStore: Send + Sync {
    fn settings(&self) -> &Settings;

    /// Tags that invalidate cached pages built from these settings.
    fn cache_tags(&self) -> Vec<String>;
}

impl SettingsStore for Settings {
    fn settings(&self) -> &Settings {
        self
    }

    fn cache_tags(&self) -> Vec<String> {
        vec![format!("config:{SETTINGS_NAME}")]
    }
}

impl Settings {
    pub fn is_api_configured(&self) -> bool {
        !self.api.key.trim().is_empty() && !self.api.endpoint.trim().is_empty()
    }

    pub fn is_location_configured(&self) -> bool {
        !self.location.city.trim().is_empty()
    }

    /// Credentials as sent to the provider, surrounding whitespace removed.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api.key.trim(), self.api.endpoint.trim())
    }

    /// The configured default location, with the configured units.
    pub fn location_query(&self) -> LocationQuery {
        LocationQuery::city(self.location.city.trim())
            .with_country(self.location.country_code.trim())
            .with_units(Some(self.other.units.clone()))
    }

    /// Copy with the text fields trimmed, the way they are sent to the provider.
    pub fn normalized(&self) -> Settings {
        let Credentials { key, endpoint } = self.credentials();
        let location = self.location_query();
        Settings {
            api: ApiSettings { key, endpoint },
            location: LocationSettings { city: location.city, country_code: location.country_code },
            other: self.other.clone(),
        }
    }

    /// Load settings from the platform config dir, or defaults if the file doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: nothing stored yet.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the settings file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-page", "weather-page")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("settings.toml"))
    }
}
