use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement system used for display and for provider queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    /// Suffix for temperatures, e.g. "27°C".
    pub fn temp_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// Suffix for wind speeds as the provider reports them per unit system.
    pub fn wind_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported values: metric, imperial."
            )),
        }
    }
}

/// Result of resolving a free-text city name to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Conditions observed at the time of the fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub condition: String,
}

/// One hourly forecast entry, chronological from the nearest future hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub wind_speed: f64,
    pub condition: String,
}

/// One daily forecast entry; the temperature is the provider's daytime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
}

/// Complete current + hourly + daily payload for one location at one point
/// in time. Hourly is capped at 12 entries and daily at 4 by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub timezone_offset_secs: i32,
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
}

/// A snapshot paired with the label it is displayed under: the geocoded
/// city name, or a fixed placeholder for device-location fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySnapshot {
    pub city: String,
    pub weather: WeatherSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_system_as_str_roundtrip() {
        for units in UnitSystem::all() {
            let s = units.as_str();
            let parsed = UnitSystem::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_unit_system_error() {
        let err = UnitSystem::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn toggle_flips_between_systems() {
        assert_eq!(UnitSystem::Metric.toggle(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggle(), UnitSystem::Metric);
    }

    #[test]
    fn unit_system_persists_as_lowercase_json() {
        let raw = serde_json::to_string(&UnitSystem::Imperial).expect("serialize");
        assert_eq!(raw, "\"imperial\"");

        let parsed: UnitSystem = serde_json::from_str("\"metric\"").expect("deserialize");
        assert_eq!(parsed, UnitSystem::Metric);
    }
}
