use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A deserialized forecast response.
///
/// Only the commonly used fields are typed; anything else the provider sends
/// is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone. Replaced by the caller's override when one was given.
    pub timezone: String,
    pub offset: Option<f64>,
    pub elevation: Option<f64>,
    pub currently: Option<DataPoint>,
    pub minutely: Option<DataBlock>,
    pub hourly: Option<DataBlock>,
    pub daily: Option<DataBlock>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    pub flags: Option<Flags>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Forecast {
    /// Observation time of the `currently` block.
    pub fn current_time(&self) -> Option<DateTime<Utc>> {
        self.currently.as_ref().and_then(DataPoint::time_utc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBlock {
    pub summary: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

/// Conditions at a single point in time (a minute, an hour or a day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// Unix seconds.
    pub time: i64,
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub precip_intensity: Option<f64>,
    pub precip_intensity_max: Option<f64>,
    pub precip_probability: Option<f64>,
    pub precip_type: Option<String>,
    pub precip_accumulation: Option<f64>,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub temperature_high: Option<f64>,
    pub temperature_low: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub ozone: Option<f64>,
    pub nearest_storm_distance: Option<f64>,
    pub nearest_storm_bearing: Option<f64>,
    pub sunrise_time: Option<i64>,
    pub sunset_time: Option<i64>,
    pub moon_phase: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataPoint {
    pub fn time_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

/// A severe weather alert issued for the requested location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    #[serde(default)]
    pub regions: Vec<String>,
    pub severity: Option<String>,
    pub time: Option<i64>,
    pub expires: Option<i64>,
    pub description: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(rename = "nearest-station")]
    pub nearest_station: Option<f64>,
    pub units: Option<String>,
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
