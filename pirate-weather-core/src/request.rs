//! Request construction shared by the blocking and async clients.
//!
//! Nothing here touches the network: coordinates are validated, the endpoint
//! path is assembled and the optional query parameters are normalized.

use crate::{
    error::{PirateWeatherError, Result},
    types::{Language, Units, Weather},
};

pub const BASE_URL: &str = "https://api.pirateweather.net/forecast";
pub const TIME_MACHINE_URL: &str = "https://timemachine.pirateweather.net/forecast";

/// Which provider host a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// Live and short-term forecast.
    Base,
    /// Historical data by absolute timestamp.
    TimeMachine,
}

/// Host URLs for both API versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: String,
    pub time_machine: String,
}

impl Endpoints {
    /// Point both versions at the same host, e.g. a local mock server.
    pub fn single(host: impl Into<String>) -> Self {
        let host = host.into();
        Self { base: host.clone(), time_machine: host }
    }

    pub fn host(&self, version: ApiVersion) -> &str {
        match version {
            ApiVersion::Base => &self.base,
            ApiVersion::TimeMachine => &self.time_machine,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self { base: BASE_URL.to_string(), time_machine: TIME_MACHINE_URL.to_string() }
    }
}

/// Optional parameters of a forecast request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastOptions {
    /// Request hour-by-hour data for the extended range.
    pub extend: bool,
    pub lang: Language,
    pub units: Units,
    /// Blocks to leave out of the response, sent in this order.
    pub exclude: Vec<Weather>,
    /// IANA timezone that replaces the provider's `timezone` in the result.
    pub timezone: Option<String>,
}

impl ForecastOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(mut self, extend: bool) -> Self {
        self.extend = extend;
        self
    }

    pub fn lang(mut self, lang: Language) -> Self {
        self.lang = lang;
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn exclude(mut self, exclude: impl IntoIterator<Item = Weather>) -> Self {
        self.exclude = exclude.into_iter().collect();
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

pub fn validate_lat_long(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(PirateWeatherError::InvalidCoordinate { latitude, longitude });
    }
    Ok(())
}

/// Build `{host}/{api_key}/{latitude},{longitude}[,{time}]`.
///
/// `time` is either absolute Unix seconds or a signed offset from now,
/// depending on the caller.
pub fn build_url(
    host: &str,
    api_key: &str,
    latitude: f64,
    longitude: f64,
    time: Option<i64>,
) -> Result<String> {
    validate_lat_long(latitude, longitude)?;

    let url = match time {
        Some(time) => format!("{host}/{api_key}/{latitude},{longitude},{time}"),
        None => format!("{host}/{api_key}/{latitude},{longitude}"),
    };
    Ok(url)
}

/// Comma-joined block names, or `None` when nothing is excluded.
pub fn exclude_param(exclude: &[Weather]) -> Option<String> {
    if exclude.is_empty() {
        return None;
    }
    Some(exclude.iter().map(Weather::as_str).collect::<Vec<_>>().join(","))
}

/// Query string pairs for a request. Unset options are left out entirely.
pub fn query_params(options: &ForecastOptions) -> Vec<(&'static str, String)> {
    let extend = options.extend.then(|| Weather::Hourly.as_str().to_string());

    [
        ("extend", extend),
        ("lang", Some(options.lang.as_str().to_string())),
        ("units", Some(options.units.as_str().to_string())),
        ("exclude", exclude_param(&options.exclude)),
        ("timezone", options.timezone.clone().filter(|tz| !tz.trim().is_empty())),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v)))
    .collect()
}

/// Replace the API key path segment so URLs can be logged.
pub(crate) fn redact(url: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        return url.to_string();
    }
    url.replace(&format!("/{api_key}/"), "/***/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_coordinates_are_valid() {
        assert!(validate_lat_long(0.0, 0.0).is_ok());
        assert!(validate_lat_long(90.0, 180.0).is_ok());
        assert!(validate_lat_long(-90.0, -180.0).is_ok());
        assert!(validate_lat_long(52.52, 13.41).is_ok());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        for (lat, lon) in [(90.0001, 0.0), (-90.0001, 0.0), (0.0, 180.0001), (0.0, -180.0001)] {
            let err = validate_lat_long(lat, lon).unwrap_err();
            assert!(
                matches!(err, PirateWeatherError::InvalidCoordinate { latitude, longitude }
                    if latitude == lat && longitude == lon),
                "({lat}, {lon}) should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        assert!(validate_lat_long(f64::NAN, 0.0).is_err());
        assert!(validate_lat_long(0.0, f64::NAN).is_err());
    }

    #[test]
    fn build_url_without_time() {
        let url = build_url(BASE_URL, "KEY", 45.42, -75.69, None).unwrap();
        assert_eq!(url, "https://api.pirateweather.net/forecast/KEY/45.42,-75.69");
    }

    #[test]
    fn build_url_appends_time_to_coordinates() {
        let url = build_url(TIME_MACHINE_URL, "KEY", 10.0, 20.0, Some(1_700_000_000)).unwrap();
        assert_eq!(url, "https://timemachine.pirateweather.net/forecast/KEY/10,20,1700000000");

        let url = build_url(BASE_URL, "KEY", 10.0, 20.0, Some(-3600)).unwrap();
        assert!(url.ends_with("/KEY/10,20,-3600"));
    }

    #[test]
    fn build_url_validates_first() {
        let err = build_url(BASE_URL, "KEY", 91.0, 0.0, None).unwrap_err();
        assert!(matches!(err, PirateWeatherError::InvalidCoordinate { .. }));
    }

    #[test]
    fn endpoints_select_host_by_version() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.host(ApiVersion::Base), BASE_URL);
        assert_eq!(endpoints.host(ApiVersion::TimeMachine), TIME_MACHINE_URL);

        let mock = Endpoints::single("http://127.0.0.1:1234");
        assert_eq!(mock.host(ApiVersion::TimeMachine), "http://127.0.0.1:1234");
    }

    #[test]
    fn exclude_param_keeps_order() {
        assert_eq!(exclude_param(&[]), None);
        assert_eq!(
            exclude_param(&[Weather::Minutely, Weather::Alerts, Weather::Currently]).as_deref(),
            Some("minutely,alerts,currently")
        );
    }

    #[test]
    fn default_query_has_only_lang_and_units() {
        let params = query_params(&ForecastOptions::default());
        assert_eq!(params, vec![("lang", "en".to_string()), ("units", "auto".to_string())]);
    }

    #[test]
    fn full_query_in_wire_order() {
        let options = ForecastOptions::new()
            .extend(true)
            .lang(Language::German)
            .units(Units::Si)
            .exclude([Weather::Daily, Weather::Flags])
            .timezone("Europe/Berlin");

        let params = query_params(&options);
        assert_eq!(
            params,
            vec![
                ("extend", "hourly".to_string()),
                ("lang", "de".to_string()),
                ("units", "si".to_string()),
                ("exclude", "daily,flags".to_string()),
                ("timezone", "Europe/Berlin".to_string()),
            ]
        );
    }

    #[test]
    fn extend_false_is_omitted() {
        let params = query_params(&ForecastOptions::new().extend(false));
        assert!(params.iter().all(|(k, _)| *k != "extend"));
    }

    #[test]
    fn blank_timezone_is_omitted() {
        for tz in ["", "  "] {
            let params = query_params(&ForecastOptions::new().timezone(tz));
            assert_eq!(params, vec![("lang", "en".to_string()), ("units", "auto".to_string())]);
        }
    }

    #[test]
    fn redact_hides_api_key() {
        let url = build_url(BASE_URL, "SECRET", 1.0, 2.0, None).unwrap();
        assert_eq!(redact(&url, "SECRET"), "https://api.pirateweather.net/forecast/***/1,2");
    }
}
