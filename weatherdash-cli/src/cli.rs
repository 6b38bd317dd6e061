use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weatherdash_core::{Config, FileStore, SessionController, Units, client_from_config};

use crate::{dashboard, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key in the config file.
    Configure,

    /// Interactive dashboard with search, history and auto-refresh.
    Dashboard,

    /// Show current weather for a city once.
    Show {
        /// City name, e.g. "Tokyo" or "London,GB".
        city: String,

        /// Switch the saved unit preference before searching.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// List recent searches, most recent first.
    Recent,

    /// Show the unit preference, or change it.
    Units {
        #[arg(value_parser = parse_units)]
        units: Option<Units>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Dashboard => {
                let session = session_from_config(&config)?;
                dashboard::run(session).await?;
            }
            Command::Show { city, units } => {
                let session = session_from_config(&config)?;
                if let Some(units) = units {
                    session.change_units(units);
                }

                let city = city.trim();
                if city.is_empty() {
                    bail!("City is required");
                }

                session.search(city).await;
                session.dispose();

                let state = session.state();
                if let Some(error) = state.error {
                    bail!(error);
                }
                if let Some(snapshot) = &state.snapshot {
                    println!("{}", render::weather_panel(snapshot));
                }
            }
            Command::Recent => {
                let session = session_from_config(&config)?;
                let state = session.state();
                if state.recent.is_empty() {
                    println!("No recent searches.");
                }
                for (i, city) in state.recent.iter().enumerate() {
                    println!("{:>2}. {city}", i + 1);
                }
            }
            Command::Units { units } => {
                let session = session_from_config(&config)?;
                match units {
                    Some(units) => {
                        session.change_units(units);
                        println!("Units set to {}", render::units_label(units));
                    }
                    None => println!("{}", render::units_label(session.state().units)),
                }
            }
        }

        Ok(())
    }
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}

/// Wire the OpenWeatherMap client and the on-disk state file into a session.
fn session_from_config(config: &Config) -> anyhow::Result<SessionController> {
    let client = client_from_config(config)?;
    let store = FileStore::open(Config::state_file_path()?);
    tracing::debug!(path = %store.path().display(), "using state file");

    Ok(SessionController::new(client, Arc::new(store), config.refresh_interval()))
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}
