use crate::config::API_KEY_ENV;

/// Everything that can go wrong while fetching current weather.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error(
        "Missing OpenWeatherMap API key. Set {} or run `weatherdash configure`.",
        API_KEY_ENV
    )]
    Configuration,

    #[error("City is required")]
    Validation,

    /// Non-success HTTP status; carries the provider's message when it sent one.
    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),
}
