//! Core library for the `weather-dash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather HTTP client (geocoding + snapshot fetch)
//! - The persisted preference store
//! - The dashboard controller and its view state
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries
//! or services.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod location;
pub mod model;
pub mod prefs;

pub use client::{WeatherApi, WeatherClient};
pub use config::Config;
pub use dashboard::{CURRENT_LOCATION_LABEL, Dashboard, DashboardState};
pub use error::WeatherError;
pub use location::{LocationSource, StaticLocation};
pub use model::{CitySnapshot, GeocodeResult, UnitSystem, WeatherSnapshot};
pub use prefs::{FilePrefs, MemoryPrefs, PrefStore};
