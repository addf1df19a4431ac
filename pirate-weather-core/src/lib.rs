//! Client library for the Pirate Weather forecast API.
//!
//! This crate defines:
//! - Request construction (coordinate validation, endpoint URLs, query parameters)
//! - Blocking and async transports
//! - The `Forecast` response model
//! - On-disk configuration for the CLI
//!
//! It is used by `pirate-weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod request;
pub mod transport;
pub mod types;

pub use client::{AsyncForecastApi, ForecastApi, PirateWeather, PirateWeatherAsync};
pub use config::Config;
pub use error::{PirateWeatherError, Result};
pub use model::{Alert, DataBlock, DataPoint, Flags, Forecast};
pub use request::{ApiVersion, Endpoints, ForecastOptions};
pub use types::{Language, Units, Weather};
