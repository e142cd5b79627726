use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::WeatherError;
use crate::model::{
    CurrentConditions, DailyEntry, GeocodeResult, HourlyEntry, UnitSystem, WeatherSnapshot,
};

/// Hourly entries kept from the provider payload.
pub const HOURLY_LIMIT: usize = 12;
/// Daily entries kept from the provider payload.
pub const DAILY_LIMIT: usize = 4;

/// Seam between the dashboard controller and the HTTP client, so tests can
/// substitute a fake provider.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Resolve a free-text city name to a display name and coordinates.
    async fn geocode_city(&self, city: &str) -> Result<GeocodeResult, WeatherError>;

    /// Fetch the current/hourly/daily snapshot for a coordinate pair.
    async fn fetch_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

/// OpenWeather HTTP client. Stateless per call: no cache, no retry, every
/// call issues a fresh request.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            config.api_key.clone().unwrap_or_default(),
            config.base_url.clone(),
        )
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { http: Client::new(), base_url, api_key }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{path}", self.base_url);
        let res = self.http.get(&url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Provider { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn geocode_city(&self, city: &str) -> Result<GeocodeResult, WeatherError> {
        let parsed: OwGeocodeResponse = self
            .get_json("weather", &[("q", city), ("appid", self.api_key.as_str())])
            .await?;

        Ok(GeocodeResult {
            name: parsed.name,
            lat: parsed.coord.lat,
            lon: parsed.coord.lon,
        })
    }

    pub async fn fetch_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let lat = lat.to_string();
        let lon = lon.to_string();

        let parsed: OwOneCallResponse = self
            .get_json(
                "onecall",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", units.as_str()),
                    ("exclude", "minutely,alerts"),
                    ("appid", self.api_key.as_str()),
                ],
            )
            .await?;

        map_snapshot(parsed)
    }
}

#[async_trait]
impl WeatherApi for WeatherClient {
    async fn geocode_city(&self, city: &str) -> Result<GeocodeResult, WeatherError> {
        WeatherClient::geocode_city(self, city).await
    }

    async fn fetch_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError> {
        WeatherClient::fetch_by_coords(self, lat, lon, units).await
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwGeocodeResponse {
    name: String,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    dt: i64,
    temp: f64,
    feels_like: f64,
    humidity: u8,
    wind_speed: f64,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwHourly {
    dt: i64,
    temp: f64,
    wind_speed: f64,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    day: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    temp: OwDailyTemp,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    timezone_offset: i32,
    current: OwCurrent,
    hourly: Vec<OwHourly>,
    daily: Vec<OwDaily>,
}

fn map_snapshot(raw: OwOneCallResponse) -> Result<WeatherSnapshot, WeatherError> {
    let current = CurrentConditions {
        time: unix_to_utc(raw.current.dt),
        temperature: raw.current.temp,
        feels_like: raw.current.feels_like,
        humidity_pct: raw.current.humidity,
        wind_speed: raw.current.wind_speed,
        condition: first_condition(raw.current.weather)?,
    };

    let hourly = raw
        .hourly
        .into_iter()
        .take(HOURLY_LIMIT)
        .map(|h| {
            Ok(HourlyEntry {
                time: unix_to_utc(h.dt),
                temperature: h.temp,
                wind_speed: h.wind_speed,
                condition: first_condition(h.weather)?,
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    let daily = raw
        .daily
        .into_iter()
        .take(DAILY_LIMIT)
        .map(|d| {
            Ok(DailyEntry {
                time: unix_to_utc(d.dt),
                temperature: d.temp.day,
                condition: first_condition(d.weather)?,
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(WeatherSnapshot {
        timezone_offset_secs: raw.timezone_offset,
        current,
        hourly,
        daily,
    })
}

fn first_condition(weather: Vec<OwWeather>) -> Result<String, WeatherError> {
    weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| WeatherError::Malformed("missing weather condition".to_string()))
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
}
