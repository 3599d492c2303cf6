use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Display-ready current conditions, independent of provider field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub location_name: String,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub wind_speed_meters_per_second: f64,
    pub condition_description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pending,
    Failed,
    Succeeded,
}

/// Result of a single mount's fetch.
///
/// Starts as `Pending` and moves to exactly one of the terminal variants.
#[derive(Debug, Clone, Default)]
pub enum RequestState {
    #[default]
    Pending,
    Failed(Arc<FetchError>),
    Succeeded(Weather),
}

impl RequestState {
    pub fn phase(&self) -> Phase {
        match self {
            RequestState::Pending => Phase::Pending,
            RequestState::Failed(_) => Phase::Failed,
            RequestState::Succeeded(_) => Phase::Succeeded,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestState::Pending)
    }

    /// User-facing message, present only when failed.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            RequestState::Failed(err) => Some(err.user_message()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn weather(&self) -> Option<&Weather> {
        match self {
            RequestState::Succeeded(weather) => Some(weather),
            _ => None,
        }
    }
}

impl From<Result<Weather, FetchError>> for RequestState {
    fn from(outcome: Result<Weather, FetchError>) -> Self {
        match outcome {
            Ok(weather) => RequestState::Succeeded(weather),
            Err(err) => RequestState::Failed(Arc::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> Weather {
        Weather {
            location_name: "London".into(),
            temperature_celsius: 15.2,
            humidity_percent: 80.0,
            wind_speed_meters_per_second: 3.1,
            condition_description: "cloudy".into(),
        }
    }

    #[test]
    fn pending_has_neither_weather_nor_error() {
        let state = RequestState::default();

        assert_eq!(state.phase(), Phase::Pending);
        assert!(!state.is_terminal());
        assert!(state.weather().is_none());
        assert!(state.error_message().is_none());
    }

    #[test]
    fn failure_carries_only_the_error() {
        let state = RequestState::from(Err(FetchError::MissingCondition));

        assert_eq!(state.phase(), Phase::Failed);
        assert!(state.is_terminal());
        assert_eq!(state.error_message(), Some("Failed to fetch weather data"));
        assert!(matches!(state.error(), Some(FetchError::MissingCondition)));
        assert!(state.weather().is_none());
    }

    #[test]
    fn success_carries_only_the_weather() {
        let state = RequestState::from(Ok(london()));

        assert_eq!(state.phase(), Phase::Succeeded);
        assert_eq!(state.weather(), Some(&london()));
        assert!(state.error_message().is_none());
        assert!(state.error().is_none());
    }
}
