use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, model::Weather};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current conditions for a city.
///
/// `FetchController` talks to this trait so tests can substitute doubles.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<Weather, FetchError>;
}
