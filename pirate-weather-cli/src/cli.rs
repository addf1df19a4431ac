use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Password, Select, Text};
use pirate_weather_core::{
    AsyncForecastApi, Config, Forecast, ForecastOptions, Language, PirateWeather,
    PirateWeatherAsync, Units, Weather,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pirate-weather", version, about = "Pirate Weather CLI")]
pub struct Cli {
    /// Verbosity level (-v debug, -vv trace). `RUST_LOG` overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default request options.
    Configure,

    /// Current conditions and forecast for a location.
    Forecast {
        #[command(flatten)]
        location: Location,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Historical conditions at an absolute time.
    TimeMachine {
        #[command(flatten)]
        location: Location,

        /// RFC 3339 timestamp or Unix seconds.
        #[arg(value_parser = parse_time, allow_negative_numbers = true)]
        time: DateTime<Utc>,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Conditions at a time close to now, requested as an offset from now.
    Recent {
        #[command(flatten)]
        location: Location,

        /// RFC 3339 timestamp or Unix seconds.
        #[arg(value_parser = parse_time, allow_negative_numbers = true)]
        time: DateTime<Utc>,

        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Debug, Args)]
pub struct Location {
    /// Latitude in degrees, -90 to 90.
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude in degrees, -180 to 180.
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Request hour-by-hour data for the extended range.
    #[arg(long)]
    pub extend: bool,

    /// Summary language, e.g. "en" or "zh-tw". Defaults to the configured one.
    #[arg(long)]
    pub lang: Option<Language>,

    /// Unit system: auto, ca, uk2, us or si. Defaults to the configured one.
    #[arg(long)]
    pub units: Option<Units>,

    /// Comma-separated blocks to leave out, e.g. "minutely,alerts".
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<Weather>,

    /// IANA timezone to report the forecast in.
    #[arg(long)]
    pub timezone: Option<String>,

    /// Print the forecast as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RequestArgs {
    fn options(&self, config: &Config) -> ForecastOptions {
        let mut options = config.forecast_options().extend(self.extend).exclude(self.exclude.iter().copied());
        if let Some(lang) = self.lang {
            options = options.lang(lang);
        }
        if let Some(units) = self.units {
            options = options.units(units);
        }
        if let Some(timezone) = &self.timezone {
            options = options.timezone(timezone.clone());
        }
        options
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Forecast { location, request } => {
                let config = Config::load()?;
                let client = PirateWeatherAsync::new(config.api_key()?, config.gzip);
                let session = session(config.gzip)?;

                let forecast = client
                    .get_forecast(&session, location.latitude, location.longitude, &request.options(&config))
                    .await?;
                print_forecast(&forecast, request.json)
            }
            Command::TimeMachine { location, time, request } => {
                let config = Config::load()?;
                let client = PirateWeatherAsync::new(config.api_key()?, config.gzip);
                let session = session(config.gzip)?;

                let forecast = client
                    .get_time_machine_forecast(
                        &session,
                        location.latitude,
                        location.longitude,
                        time,
                        &request.options(&config),
                    )
                    .await?;
                print_forecast(&forecast, request.json)
            }
            Command::Recent { location, time, request } => {
                let config = Config::load()?;
                let api_key = config.api_key()?;
                let options = request.options(&config);
                let gzip = config.gzip;

                // Only the blocking client offers this operation.
                let forecast = tokio::task::spawn_blocking(move || {
                    PirateWeather::new(api_key, gzip)?.get_recent_time_machine_forecast(
                        location.latitude,
                        location.longitude,
                        time,
                        &options,
                    )
                })
                .await
                .context("Blocking forecast task failed")??;
                print_forecast(&forecast, request.json)
            }
        }
    }
}

/// Caller-owned HTTP session for the async client. Its `Accept-Encoding`
/// follows the configured gzip setting.
fn session(gzip: bool) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder().gzip(gzip).build().context("Failed to create HTTP client")
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Pirate Weather API key:").without_confirmation().prompt()?;
    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.api_key = Some(api_key.to_string());
    }

    config.gzip = Confirm::new("Request gzip-compressed responses?").with_default(config.gzip).prompt()?;

    let units = Units::all().to_vec();
    let cursor = units.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Default units:", units).with_starting_cursor(cursor).prompt()?;

    let lang = Text::new("Default language code:").with_default(config.lang.as_str()).prompt()?;
    config.lang = lang.parse()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_forecast(forecast: &Forecast, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(forecast)?);
        return Ok(());
    }

    println!("Location: {}, {} ({})", forecast.latitude, forecast.longitude, forecast.timezone);

    if let Some(current) = &forecast.currently {
        let when = forecast.current_time().map(|t| t.to_rfc3339()).unwrap_or_else(|| current.time.to_string());
        println!("Now ({when}): {}", current.summary.as_deref().unwrap_or("Unknown"));
        if let Some(temp) = current.temperature {
            println!("  Temperature: {temp:.1}");
        }
        if let Some(feels) = current.apparent_temperature {
            println!("  Feels like:  {feels:.1}");
        }
        if let Some(humidity) = current.humidity {
            println!("  Humidity:    {:.0}%", humidity * 100.0);
        }
        if let Some(wind) = current.wind_speed {
            println!("  Wind speed:  {wind:.1}");
        }
    }

    for (name, block) in [("Hourly", &forecast.hourly), ("Daily", &forecast.daily)] {
        if let Some(summary) = block.as_ref().and_then(|b| b.summary.as_deref()) {
            println!("{name}: {summary}");
        }
    }

    for alert in &forecast.alerts {
        println!("Alert: {}", alert.title);
    }

    Ok(())
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("Unix time {secs} is out of range"));
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Expected RFC 3339 or Unix seconds, got '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pirate_weather_core::Endpoints;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    #[test]
    fn parse_time_accepts_unix_seconds_and_rfc3339() {
        assert_eq!(parse_time("1700000000").unwrap().timestamp(), 1_700_000_000);
        assert_eq!(parse_time("2020-01-01T01:00:00+01:00").unwrap().timestamp(), 1_577_836_800);
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn parses_negative_coordinates_and_options() {
        let cli = Cli::try_parse_from([
            "pirate-weather",
            "forecast",
            "-33.87",
            "151.21",
            "--units",
            "si",
            "--exclude",
            "minutely,alerts",
            "--extend",
        ])
        .expect("arguments should parse");

        let Command::Forecast { location, request } = cli.command else {
            panic!("expected forecast command");
        };
        assert_eq!(location.latitude, -33.87);
        assert_eq!(request.units, Some(Units::Si));
        assert_eq!(request.exclude, vec![Weather::Minutely, Weather::Alerts]);

        let options = request.options(&Config::default());
        assert!(options.extend);
        assert_eq!(options.units, Units::Si);
        assert_eq!(options.lang, Language::English);
    }

    async fn accept_encoding_sent(gzip: bool) -> Option<String> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 10.0,
                "longitude": 20.0,
                "timezone": "Africa/Lagos"
            })))
            .mount(&mock_server)
            .await;

        let client = PirateWeatherAsync::with_endpoints("KEY", gzip, Endpoints::single(mock_server.uri()));
        let session = session(gzip).expect("session should build");
        client
            .get_forecast(&session, 10.0, 20.0, &ForecastOptions::default())
            .await
            .expect("forecast should succeed");

        let requests = mock_server.received_requests().await.expect("recording is enabled");
        requests[0]
            .headers
            .get("accept-encoding")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn session_without_gzip_sends_no_accept_encoding() {
        assert_eq!(accept_encoding_sent(false).await, None);
    }

    #[tokio::test]
    async fn session_with_gzip_asks_for_gzip() {
        assert_eq!(accept_encoding_sent(true).await.as_deref(), Some("gzip"));
    }

    #[test]
    fn rejects_unknown_units() {
        let result = Cli::try_parse_from(["pirate-weather", "forecast", "1", "2", "--units", "metric"]);
        assert!(result.is_err());
    }
}
