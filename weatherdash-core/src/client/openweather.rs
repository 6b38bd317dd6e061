use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Units, WeatherError, WeatherSnapshot};

use super::WeatherClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("weatherdash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

impl OwCurrentResponse {
    fn into_snapshot(self, units: Units) -> WeatherSnapshot {
        let (description, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_default();

        WeatherSnapshot {
            city: self.name,
            country: self.sys.and_then(|s| s.country),
            description,
            icon,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed: self.wind.map(|w| w.speed).unwrap_or_default(),
            units,
            observed_at: self.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            fetched_at: Local::now(),
        }
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_current_weather(
        &self,
        city: &str,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::Configuration)?;
        if city.is_empty() {
            return Err(WeatherError::Validation);
        }

        let url = format!("{}/weather", self.base_url);
        debug!(%city, %units, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("units", units.as_str()), ("appid", api_key)])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = res.status();
        // The request URL carries the API key; keep it out of messages and logs.
        let body = res.text().await.map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(%city, %status, %message, "OpenWeather request failed");
            return Err(WeatherError::Request(message));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_snapshot(units))
    }
}

/// Provider's own `message` when the body carries one, otherwise a generic line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
