use async_trait::async_trait;

use crate::error::WeatherError;

/// One-shot device position lookup. A dashboard without a source treats the
/// capability as absent.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Resolve the device position as (latitude, longitude).
    async fn current_position(&self) -> Result<(f64, f64), WeatherError>;
}

/// Fixed coordinates, e.g. taken from the config file.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation {
    pub lat: f64,
    pub lon: f64,
}

#[async_trait]
impl LocationSource for StaticLocation {
    async fn current_position(&self) -> Result<(f64, f64), WeatherError> {
        Ok((self.lat, self.lon))
    }
}
