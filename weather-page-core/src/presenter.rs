//! Maps a successful weather report onto the flat structure handed to templates.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;

use crate::model::{
    Clouds, Condition, Coordinates, DateFormat, MainMetrics, Sys, Units, WeatherReport, Wind,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresentError {
    /// The provider reported success without any weather condition.
    #[error("Weather report for '{city}' contains no weather conditions")]
    EmptyConditions { city: String },
}

/// Everything a template needs to render the weather page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub base: String,
    pub clouds: Clouds,
    pub coord: Coordinates,
    /// Observation time, unix seconds.
    pub date: i64,
    pub date_format: DateFormat,
    pub temperature: MainMetrics,
    pub city: String,
    pub sys: Sys,
    pub timezone: i32,
    pub units: Units,
    pub visibility: Option<u32>,
    pub wind: Wind,
    pub weather: Condition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_tags: Option<Vec<String>>,
}

/// Build the display model. Only the first weather condition is kept.
pub fn present(
    report: WeatherReport,
    units: Units,
    date_format: DateFormat,
    cache_tags: Option<Vec<String>>,
) -> Result<DisplayModel, PresentError> {
    let WeatherReport {
        base,
        clouds,
        coord,
        dt,
        main,
        name,
        sys,
        timezone,
        visibility,
        wind,
        weather,
    } = report;

    let Some(weather) = weather.into_iter().next() else {
        return Err(PresentError::EmptyConditions { city: name });
    };

    Ok(DisplayModel {
        base,
        clouds,
        coord,
        date: dt,
        date_format,
        temperature: main,
        city: name,
        sys,
        timezone,
        units,
        visibility,
        wind,
        weather,
        cache_tags,
    })
}

impl DisplayModel {
    /// Local observation time at the reported location.
    pub fn local_time(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.timezone)?;
        DateTime::from_timestamp(self.date, 0).map(|utc| utc.with_timezone(&offset))
    }

    /// Observation time rendered with the selected date format.
    pub fn formatted_date(&self) -> Option<String> {
        self.local_time()
            .map(|local| local.format(self.date_format.chrono_format()).to_string())
    }
}
