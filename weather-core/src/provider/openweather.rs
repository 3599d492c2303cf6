use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{config::FetchConfig, error::FetchError, model::Weather};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.api_key.clone(), config.base_url.clone())
    }

    /// Replace the HTTP client, e.g. one without proxy lookup.
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn current_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CURRENT_WEATHER_PATH)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<Weather, FetchError> {
        let url = self.current_url();
        debug!(%url, city, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        parse_current(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl TryFrom<OwCurrentResponse> for Weather {
    type Error = FetchError;

    fn try_from(raw: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = raw.weather.into_iter().next().ok_or(FetchError::MissingCondition)?;

        Ok(Weather {
            location_name: raw.name,
            temperature_celsius: raw.main.temp,
            humidity_percent: raw.main.humidity,
            wind_speed_meters_per_second: raw.wind.speed,
            condition_description: condition.description,
        })
    }
}

/// Normalize an OpenWeather current-conditions body.
pub fn parse_current(body: &str) -> Result<Weather, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body).map_err(FetchError::Parse)?;
    Weather::try_from(parsed)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
