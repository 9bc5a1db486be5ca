use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use weather_core::{Config, Coordinate, Granularity, WeatherQuery, WeatherService};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-mcp", version, about = "Station-based weather lookups")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Meteostat API key.
    Configure,

    /// List stations with coverage for a date and granularity.
    Stations(QueryArgs),

    /// Show observations, summary and normals from the selected stations.
    Show {
        #[command(flatten)]
        query: QueryArgs,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show climate normals from the nearest station that publishes them.
    Normals {
        #[command(flatten)]
        location: LocationArgs,

        /// Restrict to one month (1-12).
        #[arg(long)]
        month: Option<u32>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Date as YYYY-MM-DD; if absent, means yesterday (UTC).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// "hourly" or "daily".
    #[arg(long, short, default_value = "daily")]
    pub granularity: Granularity,
}

impl LocationArgs {
    fn coordinate(&self) -> anyhow::Result<Coordinate> {
        Ok(Coordinate::new(self.lat, self.lon)?)
    }
}

impl QueryArgs {
    pub fn to_query(&self) -> anyhow::Result<WeatherQuery> {
        let date = match self.date {
            Some(date) => date,
            None => chrono::Utc::now()
                .date_naive()
                .pred_opt()
                .context("Could not determine yesterday's date")?,
        };

        Ok(WeatherQuery::new(self.location.coordinate()?, date, self.granularity))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Stations(args) => {
                let query = args.to_query()?;
                let stations = service()?.find_stations(&query).await?;
                print!("{}", output::stations(&query, &stations));
                Ok(())
            }
            Command::Show { query, json } => {
                let query = query.to_query()?;
                let result = service()?.query(&query).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print!("{}", output::weather(&result));
                }
                Ok(())
            }
            Command::Normals {
                location,
                month,
                json,
            } => {
                let result = service()?.get_normals(location.coordinate()?, month).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print!("{}", output::normals(&result));
                }
                Ok(())
            }
        }
    }
}

fn service() -> anyhow::Result<WeatherService> {
    let config = Config::load()?;
    Ok(WeatherService::from_config(&config)?)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if config.is_configured() {
        let replace = inquire::Confirm::new("An API key is already configured. Replace it?")
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if !replace {
            println!("Kept the existing API key");
            return Ok(());
        }
    }

    let api_key = inquire::Password::new("Meteostat (RapidAPI) API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
