//! Panel rendering for the terminal dashboard.
//!
//! Mirrors the view surface: loading indicator, error banner (with any
//! stale data still shown beneath it), current conditions, the hourly
//! strip, the first three daily entries, and an empty-state hint.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use dashboard_core::dashboard::DashboardState;
use dashboard_core::model::{CitySnapshot, UnitSystem};

/// Daily entries rendered out of the (up to) four fetched.
pub const DAILY_SHOWN: usize = 3;

pub fn render(state: &DashboardState) {
    print!("{}", render_to_string(state));
}

pub fn render_to_string(state: &DashboardState) -> String {
    let mut out = String::new();

    if state.loading {
        out.push_str("Loading...\n");
    }
    if let Some(err) = &state.error {
        out.push_str(&format!("Error: {err}\n"));
    }
    if !state.loading {
        if let Some(snap) = &state.snapshot {
            out.push_str(&snapshot_panels(snap, state.units));
        } else if state.error.is_none() {
            out.push_str("Search for a city to get started\n");
        }
    }

    out
}

fn snapshot_panels(snap: &CitySnapshot, units: UnitSystem) -> String {
    let weather = &snap.weather;
    let current = &weather.current;
    let offset = weather.timezone_offset_secs;

    let mut out = String::new();

    out.push_str(&format!(
        "{}  {}  {}\n",
        snap.city,
        format_temp(current.temperature, units),
        current.condition
    ));
    out.push_str(&format!(
        "Feels like {}  Humidity {}%  Wind {} {}\n",
        format_deg(current.feels_like),
        current.humidity_pct,
        current.wind_speed,
        units.wind_suffix()
    ));
    out.push_str(&format!(
        "{}\n",
        local_time(current.time, offset).format("%a %d %b %H:%M")
    ));

    if !weather.hourly.is_empty() {
        out.push_str("\nHourly\n");
        for hour in &weather.hourly {
            out.push_str(&format!(
                "  {}  {}  {} {}\n",
                local_time(hour.time, offset).format("%H:%M"),
                format_deg(hour.temperature),
                hour.wind_speed.round(),
                units.wind_suffix()
            ));
        }
    }

    if !weather.daily.is_empty() {
        out.push_str(&format!("\n{DAILY_SHOWN} Days\n"));
        for day in weather.daily.iter().take(DAILY_SHOWN) {
            out.push_str(&format!(
                "  {}  {}  {}\n",
                local_time(day.time, offset).format("%a %d %b"),
                format_deg(day.temperature),
                day.condition
            ));
        }
    }

    out
}

/// Rounded temperature with its unit suffix, e.g. "27°C".
fn format_temp(value: f64, units: UnitSystem) -> String {
    format!("{}{}", value.round() as i64, units.temp_suffix())
}

/// Rounded temperature with a bare degree sign, e.g. "28°".
fn format_deg(value: f64) -> String {
    format!("{}°", value.round() as i64)
}

fn local_time(time: DateTime<Utc>, offset_secs: i32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
    time.with_timezone(&offset)
}
