//! HTTP transports and response post-processing.

use reqwest::{
    StatusCode,
    header::{ACCEPT_ENCODING, HeaderMap, HeaderValue},
};
use serde_json::Value;
use tracing::warn;

use crate::{
    error::{PirateWeatherError, Result},
    model::Forecast,
};

/// Headers sent with every request.
pub fn default_headers(gzip: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if gzip {
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    }
    headers
}

/// Blocking transport. Owns one pooled client that is reused for every call.
#[derive(Debug, Clone)]
pub struct RequestManager {
    http: reqwest::blocking::Client,
}

impl RequestManager {
    pub fn new(gzip: bool) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .default_headers(default_headers(gzip))
            .gzip(gzip)
            .build()?;

        Ok(Self { http })
    }

    /// GET `url` and parse the body as JSON. Any status other than 200 is a
    /// provider error carrying the raw body.
    pub fn make_request(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let res = self.http.get(url).query(params).send()?;

        let status = res.status();
        let body = res.text()?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Pirate Weather request failed");
            return Err(PirateWeatherError::Provider { code: status.as_u16(), message: body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Non-blocking transport. Holds only header configuration; the HTTP session
/// is borrowed from the caller on every request.
#[derive(Debug, Clone)]
pub struct AsyncRequestManager {
    headers: HeaderMap,
}

impl AsyncRequestManager {
    pub fn new(gzip: bool) -> Self {
        Self { headers: default_headers(gzip) }
    }

    /// GET `url` on `session` and parse the body as JSON. A body with an
    /// `error` field is a provider error.
    pub async fn make_request(
        &self,
        session: &reqwest::Client,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let res = session.get(url).headers(self.headers.clone()).query(params).send().await?;

        let status = res.status();
        let bytes = res.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;

        if let Some(error) = body.get("error") {
            let code = body.get("code").and_then(error_code).unwrap_or(status.as_u16());
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            warn!(code, "Pirate Weather request failed");
            return Err(PirateWeatherError::Provider { code, message });
        }

        Ok(body)
    }
}

fn error_code(code: &Value) -> Option<u16> {
    match code {
        Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Overwrite the provider's `timezone` with `timezone`, if given and not blank.
pub fn apply_timezone(response: &mut Value, timezone: Option<&str>) {
    let timezone = timezone.filter(|tz| !tz.trim().is_empty());
    if let (Some(tz), Some(obj)) = (timezone, response.as_object_mut()) {
        obj.insert("timezone".to_string(), Value::String(tz.to_string()));
    }
}

/// Apply the timezone override and deserialize into a [`Forecast`].
pub fn into_forecast(mut response: Value, timezone: Option<&str>) -> Result<Forecast> {
    apply_timezone(&mut response, timezone);
    Ok(serde_json::from_value(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gzip_header_only_when_enabled() {
        assert_eq!(default_headers(true).get(ACCEPT_ENCODING).unwrap(), "gzip");
        assert!(default_headers(false).is_empty());
    }

    #[test]
    fn timezone_override_replaces_provider_value() {
        let mut value = json!({ "timezone": "America/New_York" });
        apply_timezone(&mut value, Some("Europe/Paris"));
        assert_eq!(value["timezone"], "Europe/Paris");
    }

    #[test]
    fn no_override_keeps_provider_value() {
        let mut value = json!({ "timezone": "America/New_York" });
        apply_timezone(&mut value, None);
        assert_eq!(value["timezone"], "America/New_York");
    }

    #[test]
    fn blank_override_keeps_provider_value() {
        let value = json!({ "latitude": 1.0, "longitude": 2.0, "timezone": "Africa/Lagos" });
        let forecast = into_forecast(value, Some("")).unwrap();
        assert_eq!(forecast.timezone, "Africa/Lagos");
    }

    #[test]
    fn into_forecast_applies_override() {
        let value = json!({ "latitude": 1.0, "longitude": 2.0, "timezone": "UTC" });
        let forecast = into_forecast(value, Some("Asia/Tokyo")).unwrap();
        assert_eq!(forecast.timezone, "Asia/Tokyo");
    }

    #[test]
    fn error_code_accepts_numbers_and_strings() {
        assert_eq!(error_code(&json!(401)), Some(401));
        assert_eq!(error_code(&json!("429")), Some(429));
        assert_eq!(error_code(&json!(70000)), None);
        assert_eq!(error_code(&json!(null)), None);
    }

    #[test]
    fn blocking_manager_builds() {
        assert!(RequestManager::new(true).is_ok());
        assert!(RequestManager::new(false).is_ok());
    }
}
