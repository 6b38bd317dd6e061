use crate::{Config, Units, WeatherError, WeatherSnapshot, client::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Anything that can answer "what is the weather in this city right now".
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current_weather(
        &self,
        city: &str,
        units: Units,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the OpenWeatherMap client described by `config`.
///
/// A missing API key is not an error here; it surfaces on the first fetch.
pub fn client_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherClient>> {
    let client = OpenWeatherClient::new(config.api_key(), config.base_url())?;
    Ok(Arc::new(client))
}
