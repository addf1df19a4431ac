use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt;
use tracing::{debug, instrument};

use crate::{
    error::{PirateWeatherError, Result},
    model::Forecast,
    request::{ApiVersion, Endpoints, ForecastOptions, build_url, query_params, redact, validate_lat_long},
    transport::{AsyncRequestManager, RequestManager, into_forecast},
};

/// Blocking forecast operations.
pub trait ForecastApi {
    /// Live and short-term forecast for a location.
    fn get_forecast(&self, latitude: f64, longitude: f64, options: &ForecastOptions) -> Result<Forecast>;

    /// Historical conditions at `time`, served by the time machine host.
    fn get_time_machine_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        time: DateTime<Utc>,
        options: &ForecastOptions,
    ) -> Result<Forecast>;
}

/// Non-blocking forecast operations. The HTTP session is owned by the caller
/// and passed to every call.
#[async_trait]
pub trait AsyncForecastApi: Send + Sync {
    async fn get_forecast(
        &self,
        session: &reqwest::Client,
        latitude: f64,
        longitude: f64,
        options: &ForecastOptions,
    ) -> Result<Forecast>;

    async fn get_time_machine_forecast(
        &self,
        session: &reqwest::Client,
        latitude: f64,
        longitude: f64,
        time: DateTime<Utc>,
        options: &ForecastOptions,
    ) -> Result<Forecast>;
}

/// Blocking client. Must not be used from inside an async runtime; wrap calls
/// in `spawn_blocking` there.
#[derive(Clone)]
pub struct PirateWeather {
    api_key: String,
    endpoints: Endpoints,
    request_manager: RequestManager,
}

impl PirateWeather {
    pub fn new(api_key: impl Into<String>, gzip: bool) -> Result<Self> {
        Self::with_endpoints(api_key, gzip, Endpoints::default())
    }

    pub fn with_endpoints(api_key: impl Into<String>, gzip: bool, endpoints: Endpoints) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            endpoints,
            request_manager: RequestManager::new(gzip)?,
        })
    }

    /// Forecast for `time` expressed as an offset in seconds from now, sent to
    /// the base host instead of the time machine host.
    ///
    /// When `options.timezone` is set, "now" is taken in that timezone.
    ///
    /// # Errors
    ///
    /// Returns [`PirateWeatherError::InvalidTimezone`] if the timezone name is
    /// not a known IANA zone, before any request is made.
    #[instrument(skip(self, options), fields(lat = %latitude, lon = %longitude, time = %time))]
    pub fn get_recent_time_machine_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        time: DateTime<Utc>,
        options: &ForecastOptions,
    ) -> Result<Forecast> {
        validate_lat_long(latitude, longitude)?;

        let offset = recent_offset(time, Utc::now(), options.timezone.as_deref())?;
        debug!(offset, "Requesting recent time machine forecast");

        self.fetch(ApiVersion::Base, latitude, longitude, Some(offset), options)
    }

    fn fetch(
        &self,
        version: ApiVersion,
        latitude: f64,
        longitude: f64,
        time: Option<i64>,
        options: &ForecastOptions,
    ) -> Result<Forecast> {
        let url = build_url(self.endpoints.host(version), &self.api_key, latitude, longitude, time)?;
        let params = query_params(options);
        debug!(url = %redact(&url, &self.api_key), ?params, "Fetching forecast");

        let data = self.request_manager.make_request(&url, &params)?;
        into_forecast(data, options.timezone.as_deref())
    }
}

impl ForecastApi for PirateWeather {
    #[instrument(skip(self, options), fields(lat = %latitude, lon = %longitude))]
    fn get_forecast(&self, latitude: f64, longitude: f64, options: &ForecastOptions) -> Result<Forecast> {
        self.fetch(ApiVersion::Base, latitude, longitude, None, options)
    }

    #[instrument(skip(self, options), fields(lat = %latitude, lon = %longitude, time = %time))]
    fn get_time_machine_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        time: DateTime<Utc>,
        options: &ForecastOptions,
    ) -> Result<Forecast> {
        self.fetch(ApiVersion::TimeMachine, latitude, longitude, Some(time.timestamp()), options)
    }
}

impl fmt::Debug for PirateWeather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PirateWeather")
            .field("api_key", &"***")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// Non-blocking client.
///
/// There is no recent time machine operation here; use
/// [`PirateWeather::get_recent_time_machine_forecast`] or call
/// [`AsyncForecastApi::get_time_machine_forecast`] with an absolute time.
#[derive(Clone)]
pub struct PirateWeatherAsync {
    api_key: String,
    endpoints: Endpoints,
    request_manager: AsyncRequestManager,
}

impl PirateWeatherAsync {
    pub fn new(api_key: impl Into<String>, gzip: bool) -> Self {
        Self::with_endpoints(api_key, gzip, Endpoints::default())
    }

    pub fn with_endpoints(api_key: impl Into<String>, gzip: bool, endpoints: Endpoints) -> Self {
        Self {
            api_key: api_key.into(),
            endpoints,
            request_manager: AsyncRequestManager::new(gzip),
        }
    }

    async fn fetch(
        &self,
        session: &reqwest::Client,
        version: ApiVersion,
        latitude: f64,
        longitude: f64,
        time: Option<i64>,
        options: &ForecastOptions,
    ) -> Result<Forecast> {
        let url = build_url(self.endpoints.host(version), &self.api_key, latitude, longitude, time)?;
        let params = query_params(options);
        debug!(url = %redact(&url, &self.api_key), ?params, "Fetching forecast");

        let data = self.request_manager.make_request(session, &url, &params).await?;
        into_forecast(data, options.timezone.as_deref())
    }
}

#[async_trait]
impl AsyncForecastApi for PirateWeatherAsync {
    #[instrument(skip(self, session, options), fields(lat = %latitude, lon = %longitude))]
    async fn get_forecast(
        &self,
        session: &reqwest::Client,
        latitude: f64,
        longitude: f64,
        options: &ForecastOptions,
    ) -> Result<Forecast> {
        self.fetch(session, ApiVersion::Base, latitude, longitude, None, options).await
    }

    #[instrument(skip(self, session, options), fields(lat = %latitude, lon = %longitude, time = %time))]
    async fn get_time_machine_forecast(
        &self,
        session: &reqwest::Client,
        latitude: f64,
        longitude: f64,
        time: DateTime<Utc>,
        options: &ForecastOptions,
    ) -> Result<Forecast> {
        let time = Some(time.timestamp());
        self.fetch(session, ApiVersion::TimeMachine, latitude, longitude, time, options).await
    }
}

impl fmt::Debug for PirateWeatherAsync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PirateWeatherAsync")
            .field("api_key", &"***")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// Seconds from `now` to `time`; negative for the past. A blank timezone
/// counts as unset.
fn recent_offset(time: DateTime<Utc>, now: DateTime<Utc>, timezone: Option<&str>) -> Result<i64> {
    let now = match timezone.filter(|tz| !tz.trim().is_empty()) {
        Some(name) => {
            let tz: Tz = name.parse().map_err(|_| PirateWeatherError::InvalidTimezone(name.to_string()))?;
            now.with_timezone(&tz).timestamp()
        }
        None => now.timestamp(),
    };
    Ok(time.timestamp() - now)
}
