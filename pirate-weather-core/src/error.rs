use thiserror::Error;

/// Errors returned by the forecast clients.
#[derive(Debug, Error)]
pub enum PirateWeatherError {
    /// Latitude or longitude out of range. Raised before any request is sent.
    #[error(
        "Invalid coordinates ({latitude}, {longitude}): latitude must be -90 to 90, longitude must be -180 to 180"
    )]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// The provider answered with a failure (non-200 status or an `error` body).
    #[error("Pirate Weather returned error {code}: {message}")]
    Provider { code: u16, message: String },

    #[error("Timezone '{0}' is not a known IANA timezone")]
    InvalidTimezone(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse Pirate Weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PirateWeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinate_display_names_both_ranges() {
        let err = PirateWeatherError::InvalidCoordinate { latitude: 91.0, longitude: 0.0 };
        let msg = err.to_string();
        assert!(msg.contains("(91, 0)"));
        assert!(msg.contains("latitude must be -90 to 90"));
        assert!(msg.contains("longitude must be -180 to 180"));
    }

    #[test]
    fn provider_error_keeps_code_and_message_verbatim() {
        let err = PirateWeatherError::Provider { code: 403, message: "Forbidden".to_string() };
        assert_eq!(err.to_string(), "Pirate Weather returned error 403: Forbidden");
    }

    #[test]
    fn parse_error_converts_from_serde_json() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: PirateWeatherError = source.into();
        assert!(matches!(err, PirateWeatherError::Parse(_)));
    }
}
