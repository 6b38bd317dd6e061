//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - The session controller (search, refresh, history, auto-refresh timer)
//! - An OpenWeatherMap client behind the `WeatherClient` trait
//! - Key-value persistence for unit preference and recent searches
//! - Configuration & credentials handling
//!
//! It is used by `weatherdash-cli`, but any front end can drive a `SessionController`.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod recent;
pub mod session;
pub mod store;

pub use client::{WeatherClient, client_from_config, openweather::OpenWeatherClient};
pub use config::Config;
pub use error::WeatherError;
pub use model::{Units, WeatherSnapshot};
pub use recent::RecentSearches;
pub use session::{SessionController, SessionPhase, SessionState};
pub use store::{FileStore, KeyValueStore, MemoryStore};
