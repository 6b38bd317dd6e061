use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Unit system requested from the provider and shown in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }

    /// Parse a stored preference. Anything unrecognised falls back to metric.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| Units::try_from(v).ok()).unwrap_or_default()
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// Current conditions for one city, as last returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: Option<String>,
    pub description: String,
    pub icon: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    /// m/s for metric requests, mph for imperial ones.
    pub wind_speed: f64,
    /// Unit system the request was made with.
    pub units: Units,
    pub observed_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Local>,
}

impl WeatherSnapshot {
    /// "Tokyo, JP", or just the city when the provider sent no country.
    pub fn location_label(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {}", self.city, country),
            _ => self.city.clone(),
        }
    }

    pub fn icon_url(&self) -> Option<String> {
        self.icon
            .as_deref()
            .map(|icon| format!("https://openweathermap.org/img/wn/{icon}@2x.png"))
    }

    /// Wind in the unit people expect to read: km/h for metric, mph for imperial.
    pub fn wind_display(&self) -> String {
        match self.units {
            Units::Metric => format!("{:.1} km/h", self.wind_speed * 3.6),
            Units::Imperial => format!("{:.1} mph", self.wind_speed),
        }
    }
}
