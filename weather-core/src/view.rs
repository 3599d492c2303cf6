//! Text rendering of a [`RequestState`].

use crate::model::{RequestState, Weather};

pub const LOADING: &str = "Loading weather data...";
pub const NO_DATA: &str = "No weather data available";

/// Render the state for display. Output depends only on `state`.
pub fn render(state: &RequestState) -> String {
    match state {
        RequestState::Pending => LOADING.to_string(),
        RequestState::Failed(err) => err.user_message().to_string(),
        RequestState::Succeeded(weather) => render_weather(Some(weather)),
    }
}

/// Render a weather card, or the no-data message when there is none.
pub fn render_weather(weather: Option<&Weather>) -> String {
    let Some(weather) = weather else {
        return NO_DATA.to_string();
    };

    format!(
        "Weather in {}\n  Temperature: {:.1}°C\n  Humidity:    {}%\n  Wind speed:  {:.1} m/s\n  Condition:   {}",
        weather.location_name,
        weather.temperature_celsius,
        weather.humidity_percent,
        weather.wind_speed_meters_per_second,
        weather.condition_description,
    )
}
