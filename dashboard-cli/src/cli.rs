use std::sync::Arc;

use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};

use dashboard_core::config::Config;
use dashboard_core::dashboard::Dashboard;
use dashboard_core::location::{LocationSource, StaticLocation};
use dashboard_core::model::UnitSystem;
use dashboard_core::prefs::{FilePrefs, MemoryPrefs, PrefStore};
use dashboard_core::client::WeatherClient;

use crate::view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// City to show on startup (defaults to the configured city).
    #[arg(long)]
    pub city: Option<String>,

    /// Unit system for this run, overriding the persisted preference.
    #[arg(long, value_parser = parse_units)]
    pub units: Option<UnitSystem>,

    /// Fetch and render once, then exit.
    #[arg(long)]
    pub once: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|err| err.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            None => run_dashboard(self).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()?;
    config.api_key = Some(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn run_dashboard(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(city) = cli.city {
        config.default_city = city;
    }

    let api = Arc::new(WeatherClient::new(&config));
    let store: Arc<dyn PrefStore> = match FilePrefs::new() {
        Ok(prefs) => Arc::new(prefs),
        Err(err) => {
            tracing::warn!(%err, "preferences unavailable, falling back to in-memory store");
            Arc::new(MemoryPrefs::new())
        }
    };
    let location = config
        .position()
        .map(|(lat, lon)| Arc::new(StaticLocation { lat, lon }) as Arc<dyn LocationSource>);

    let mut dashboard = Dashboard::new(api, store, location, config.default_city.clone());

    // --units replaces the persisted preference before the first render.
    match cli.units {
        Some(units) => dashboard.set_units(units).await,
        None => dashboard.refresh().await,
    }
    view::render(dashboard.state());

    if cli.once {
        return Ok(());
    }

    run_loop(&mut dashboard).await
}

const SEARCH: &str = "Search city";
const CURRENT_LOCATION: &str = "Use current location";
const REFRESH: &str = "Refresh";
const QUIT: &str = "Quit";

async fn run_loop(dashboard: &mut Dashboard) -> anyhow::Result<()> {
    loop {
        let toggle_label = format!("Switch to {}", dashboard.state().units.toggle());
        let options = vec![
            SEARCH.to_string(),
            CURRENT_LOCATION.to_string(),
            toggle_label.clone(),
            REFRESH.to_string(),
            QUIT.to_string(),
        ];

        let choice = match Select::new("Action:", options).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        if choice == SEARCH {
            let query = match Text::new("City:").prompt() {
                Ok(query) => query,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            dashboard.set_query(query);
            dashboard.submit_search().await;
        } else if choice == CURRENT_LOCATION {
            dashboard.use_current_location().await;
        } else if choice == toggle_label {
            dashboard.toggle_units().await;
        } else if choice == REFRESH {
            dashboard.refresh().await;
        } else {
            break;
        }

        view::render(dashboard.state());
    }

    Ok(())
}
