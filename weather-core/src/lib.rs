//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Fetch configuration and the on-disk config file
//! - The OpenWeather provider behind the `WeatherProvider` seam
//! - The fetch controller driving a mount's `RequestState`
//! - Text rendering of that state
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod view;

pub use config::{Config, FetchConfig, FetchPolicy};
pub use controller::{FetchController, Mounted};
pub use error::{FETCH_FAILED_MESSAGE, FetchError};
pub use model::{Phase, RequestState, Weather};
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use view::render;
