//! Pure text rendering of session state. Nothing here talks to the network.

use std::time::Duration;

use weatherdash_core::{RecentSearches, SessionState, Units, WeatherSnapshot};

pub const LOADING: &str = "Loading...";

const DATA_SOURCE: &str = "Data from OpenWeatherMap";

/// The whole dashboard: panel, status lines and footer.
pub fn screen(state: &SessionState, refresh_every: Duration) -> String {
    let mut out = String::new();

    match &state.snapshot {
        Some(snapshot) => out.push_str(&weather_panel(snapshot)),
        None => out.push_str(&empty_panel()),
    }
    out.push('\n');

    out.push_str(&format!("\nUnits: {}\n", units_label(state.units)));
    if state.loading {
        out.push_str(LOADING);
        out.push('\n');
    }
    if let Some(error) = &state.error {
        out.push_str(&error_banner(error));
        out.push('\n');
    }
    if let Some(line) = recent_line(&state.recent) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&footer(refresh_every));
    out
}

pub fn weather_panel(snapshot: &WeatherSnapshot) -> String {
    let suffix = snapshot.units.temperature_suffix();

    let mut lines = vec![
        snapshot.location_label(),
        capitalize_words(&snapshot.description),
        format!(
            "  {}{suffix}  (feels like {}{suffix})",
            whole(snapshot.temperature),
            whole(snapshot.feels_like)
        ),
        format!("  Humidity: {}%", snapshot.humidity_pct),
        format!("  Wind: {}", snapshot.wind_display()),
    ];
    if let Some(url) = snapshot.icon_url() {
        lines.push(format!("  Icon: {url}"));
    }
    lines.push(format!("  Updated: {}", snapshot.fetched_at.format("%H:%M:%S")));

    lines.join("\n")
}

pub fn empty_panel() -> String {
    "No city selected\nSearch for a city to view weather details".to_string()
}

pub fn error_banner(message: &str) -> String {
    format!("! {message}")
}

/// `None` when there is nothing to list.
pub fn recent_line(recent: &RecentSearches) -> Option<String> {
    if recent.is_empty() {
        return None;
    }
    let cities: Vec<&str> = recent.iter().collect();
    Some(format!("Recent searches: {}", cities.join(", ")))
}

pub fn footer(refresh_every: Duration) -> String {
    let secs = refresh_every.as_secs();
    let period = if secs < 60 {
        plural(secs, "second")
    } else {
        plural((secs as f64 / 60.0).round() as u64, "minute")
    };
    format!("Auto-refresh every {period} · {DATA_SOURCE}")
}

/// The menu blocks while open, so auto-refresh results show on the next redraw.
pub fn menu_note(updated_in_background: bool) -> &'static str {
    if updated_in_background {
        "Updated by auto-refresh. New results appear after each menu choice."
    } else {
        "New results appear after each menu choice."
    }
}

pub fn units_label(units: Units) -> &'static str {
    match units {
        Units::Metric => "Metric (°C, km/h)",
        Units::Imperial => "Imperial (°F, mph)",
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 { format!("1 {unit}") } else { format!("{n} {unit}s") }
}

// i64 so that -0.4 shows as "0", not "-0".
fn whole(value: f64) -> i64 {
    value.round() as i64
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
