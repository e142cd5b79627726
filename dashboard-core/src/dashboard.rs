//! Dashboard controller: owns the view state and orchestrates fetches.
//!
//! The state machine over loading/error/data:
//!
//! - idle-empty -> loading on startup (the first `refresh`)
//! - loading -> loaded on fetch success (snapshot replaced wholesale)
//! - loading -> errored on fetch failure (stale snapshot kept)
//! - loaded/errored/idle-empty -> loading on city change, unit change,
//!   non-empty search submission, or a current-location request
//!
//! Every fetch is tagged with a monotonically increasing token; a completion
//! whose token is no longer current is discarded, so only the most recently
//! dispatched fetch determines the final state.

use std::sync::Arc;

use crate::client::WeatherApi;
use crate::error::WeatherError;
use crate::location::LocationSource;
use crate::model::{CitySnapshot, UnitSystem};
use crate::prefs::{self, PrefStore};

/// Preference key holding the persisted unit system.
pub const UNITS_PREF_KEY: &str = "units";

/// Display label for snapshots fetched from the device position, which skip
/// geocoding and so have no resolved place name.
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// Transient view state, exclusively owned by the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub query: String,
    pub city: String,
    pub units: UnitSystem,
    pub snapshot: Option<CitySnapshot>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct Dashboard {
    api: Arc<dyn WeatherApi>,
    store: Arc<dyn PrefStore>,
    location: Option<Arc<dyn LocationSource>>,
    state: DashboardState,
    fetch_seq: u64,
}

impl Dashboard {
    /// Build a dashboard in the idle-empty state. The unit preference is
    /// loaded from the store, falling back to metric.
    pub fn new(
        api: Arc<dyn WeatherApi>,
        store: Arc<dyn PrefStore>,
        location: Option<Arc<dyn LocationSource>>,
        default_city: impl Into<String>,
    ) -> Self {
        let units = prefs::load_pref(store.as_ref(), UNITS_PREF_KEY, UnitSystem::default());

        Self {
            api,
            store,
            location,
            state: DashboardState {
                city: default_city.into(),
                units,
                ..DashboardState::default()
            },
            fetch_seq: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    /// Geocode the selected city and fetch its weather. Used for startup and
    /// for every city or unit change.
    pub async fn refresh(&mut self) {
        let token = self.begin_fetch();
        let city = self.state.city.clone();
        let units = self.state.units;

        let outcome = self.fetch_city(&city, units).await;
        self.finish_fetch(token, outcome);
    }

    /// Submitting an empty query is a no-op; otherwise the query becomes the
    /// selected city and a fetch is dispatched.
    pub async fn submit_search(&mut self) {
        if self.state.query.is_empty() {
            return;
        }

        self.state.city = std::mem::take(&mut self.state.query);
        self.refresh().await;
    }

    /// Persist the unit preference and re-fetch under the new system.
    pub async fn set_units(&mut self, units: UnitSystem) {
        self.state.units = units;
        prefs::save_pref(self.store.as_ref(), UNITS_PREF_KEY, &units);
        self.refresh().await;
    }

    pub async fn toggle_units(&mut self) {
        self.set_units(self.state.units.toggle()).await;
    }

    /// Resolve the device position and fetch weather for it directly,
    /// skipping geocoding. Without a location source the dashboard goes
    /// straight to the errored state without ever entering loading.
    pub async fn use_current_location(&mut self) {
        let Some(source) = self.location.clone() else {
            self.state.error = Some(WeatherError::GeolocationUnsupported.to_string());
            return;
        };

        let token = self.begin_fetch();
        let units = self.state.units;

        let outcome = match source.current_position().await {
            Ok((lat, lon)) => self.fetch_position(lat, lon, units).await,
            Err(err) => Err(err),
        };
        self.finish_fetch(token, outcome);
    }

    async fn fetch_city(&self, city: &str, units: UnitSystem) -> Result<CitySnapshot, WeatherError> {
        let geo = self.api.geocode_city(city).await?;
        let weather = self.api.fetch_by_coords(geo.lat, geo.lon, units).await?;

        Ok(CitySnapshot { city: geo.name, weather })
    }

    async fn fetch_position(
        &self,
        lat: f64,
        lon: f64,
        units: UnitSystem,
    ) -> Result<CitySnapshot, WeatherError> {
        let weather = self.api.fetch_by_coords(lat, lon, units).await?;

        Ok(CitySnapshot {
            city: CURRENT_LOCATION_LABEL.to_string(),
            weather,
        })
    }

    /// Enter the loading state and hand out the token for this fetch.
    fn begin_fetch(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.state.loading = true;
        self.state.error = None;
        self.fetch_seq
    }

    /// Apply a fetch outcome if its token is still current; stale
    /// completions are discarded so a superseded fetch cannot overwrite the
    /// state of a later one.
    fn finish_fetch(&mut self, token: u64, outcome: Result<CitySnapshot, WeatherError>) {
        if token != self.fetch_seq {
            tracing::debug!(token, current = self.fetch_seq, "discarding stale fetch result");
            return;
        }

        self.state.loading = false;
        match outcome {
            Ok(snapshot) => {
                self.state.snapshot = Some(snapshot);
                self.state.error = None;
            }
            // Stale data stays on screen under the error banner.
            Err(err) => self.state.error = Some(err.to_string()),
        }
    }
}
