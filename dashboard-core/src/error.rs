use reqwest::StatusCode;

/// Failures surfaced by the weather client and the location port.
///
/// Every variant renders to the message shown in the dashboard's error
/// banner, so `Display` output is user-facing text.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The provider answered with a non-2xx status. The message is the raw
    /// response body, exactly as received.
    #[error("{body}")]
    Provider { status: StatusCode, body: String },

    #[error("request to weather provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response parsed as JSON but is missing an expected field.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("Geolocation is not supported")]
    GeolocationUnsupported,

    /// Device location lookup failed; carries the platform message.
    #[error("{0}")]
    Geolocation(String),
}
