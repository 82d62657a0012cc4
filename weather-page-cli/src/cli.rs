use std::{fmt, path::PathBuf};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use tracing::info;
use weather_page_core::{
    DateFormat, DisplayModel, OpenWeatherClient, PageError, Settings, Units, WeatherPage,
    validate_settings,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-page", version, about = "Current weather from OpenWeatherMap")]
pub struct Cli {
    /// Settings file. Defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit API credentials, default location and display settings.
    Configure,

    /// Show weather for the default location, or for CITY.
    Show {
        /// City name; the configured location is used when absent.
        city: Option<String>,

        /// Print the display model as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check the stored settings against the provider.
    Validate,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Settings::config_file_path()?,
        };
        let settings = Settings::load_from(&path)?;
        let client = OpenWeatherClient::new();

        match self.command {
            Command::Configure => {
                let form = prompt_settings(&settings)?;
                let errors = validate_settings(&client, &form).await?;
                if !errors.is_empty() {
                    for error in &errors {
                        eprintln!("{error}");
                    }
                    bail!("Settings were not saved.");
                }

                form.normalized().save_to(&path)?;
                info!(path = %path.display(), "Settings saved");
                println!("Settings saved to {}", path.display());
            }
            Command::Show { city, json } => {
                let page = WeatherPage::new(&client, &settings);
                let rendered = match city.as_deref() {
                    Some(city) => page.render_for_city(city).await,
                    None => page.render_default().await,
                };

                let model = match rendered {
                    Ok(model) => model,
                    Err(PageError::NotFound(message)) => bail!(message),
                    Err(PageError::AccessDenied(reason)) => bail!(
                        "Cannot show weather: {reason}.\n\
                         Hint: run `weather-page configure` first."
                    ),
                    Err(err) => return Err(err.into()),
                };

                if json {
                    let out = serde_json::to_string_pretty(&model)
                        .context("Failed to serialize weather page")?;
                    println!("{out}");
                } else {
                    print!("{}", render_text(&model));
                }
            }
            Command::Validate => {
                let errors = validate_settings(&client, &settings).await?;
                if !errors.is_empty() {
                    for error in &errors {
                        eprintln!("{error}");
                    }
                    bail!("Settings in {} are not valid.", path.display());
                }
                println!("Settings in {} are valid.", path.display());
            }
        }

        Ok(())
    }
}

fn prompt_settings(current: &Settings) -> anyhow::Result<Settings> {
    let mut form = current.clone();

    form.api.key = Text::new("API key:")
        .with_default(&current.api.key)
        .with_help_message("Please enter the API key.")
        .prompt()?;
    form.api.endpoint = Text::new("API endpoint:")
        .with_default(&current.api.endpoint)
        .with_placeholder("https://api.openweathermap.org/data/2.5/weather")
        .with_help_message("Please enter the API endpoint.")
        .prompt()?;
    form.location.city = Text::new("City:")
        .with_default(&current.location.city)
        .with_help_message("Please enter the city name.")
        .prompt()?;
    form.location.country_code = Text::new("Country code:")
        .with_default(&current.location.country_code)
        .with_help_message("ISO 3166 alpha-2 code, e.g. GB")
        .prompt()?;

    let units = Units::selectable().to_vec();
    let cursor = units.iter().position(|u| *u == current.other.units).unwrap_or(0);
    form.other.units = Select::new("Units:", units)
        .with_starting_cursor(cursor)
        .with_help_message("metric: Celsius, imperial: Fahrenheit, standard: Kelvin")
        .prompt()?;

    let formats: Vec<_> = DateFormat::all().iter().copied().map(DateFormatOption).collect();
    let cursor = DateFormat::all()
        .iter()
        .position(|f| *f == current.other.date_format)
        .unwrap_or(0);
    form.other.date_format = Select::new("Date format:", formats)
        .with_starting_cursor(cursor)
        .prompt()?
        .0;

    Ok(form)
}

/// Shows each format with the current time rendered in it.
struct DateFormatOption(DateFormat);

impl fmt::Display for DateFormatOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Utc::now().format(self.0.chrono_format()))
    }
}

fn render_text(model: &DisplayModel) -> String {
    let temp = model.units.temperature_symbol();
    let speed = model.units.speed_symbol();

    let mut out = String::new();
    match &model.sys.country {
        Some(country) => out.push_str(&format!("{}, {}\n", model.city, country)),
        None => out.push_str(&format!("{}\n", model.city)),
    }
    if let Some(date) = model.formatted_date() {
        out.push_str(&format!("{date}\n"));
    }
    out.push_str(&format!("{} ({})\n", model.weather.main, model.weather.description));
    out.push_str(&format!(
        "Temperature: {:.1}{temp} (feels like {:.1}{temp}, min {:.1}{temp}, max {:.1}{temp})\n",
        model.temperature.temp,
        model.temperature.feels_like,
        model.temperature.temp_min,
        model.temperature.temp_max,
    ));
    out.push_str(&format!(
        "Humidity: {}%  Pressure: {} hPa  Clouds: {}%\n",
        model.temperature.humidity, model.temperature.pressure, model.clouds.all
    ));
    out.push_str(&format!("Wind: {:.1} {speed}", model.wind.speed));
    if let Some(deg) = model.wind.deg {
        out.push_str(&format!(" from {deg:.0}°"));
    }
    out.push('\n');
    if let Some(visibility) = model.visibility {
        out.push_str(&format!("Visibility: {visibility} m\n"));
    }
    out
}
