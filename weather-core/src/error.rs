use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown to the user for every fetch failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data";

/// Why a weather fetch did not produce a record.
///
/// The view only ever shows [`FETCH_FAILED_MESSAGE`]; the variant and its
/// source are kept for logs and tests.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to weather provider failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("weather provider responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("weather provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to parse weather provider response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("weather provider response contained no condition entries")]
    MissingCondition,
}

impl FetchError {
    /// Network, HTTP status and timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. } | Self::Timeout(_))
    }

    /// The provider answered, but not with a usable body.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::MissingCondition)
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::Parse(_) | Self::MissingCondition => false,
        }
    }

    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_not_transport_errors() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = FetchError::Parse(json_err);

        assert!(err.is_parse());
        assert!(!err.is_transport());
        assert!(!err.is_retryable());
        assert!(FetchError::MissingCondition.is_parse());
    }

    #[test]
    fn only_server_errors_are_retryable() {
        let unavailable = FetchError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        let unauthorized = FetchError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "{\"cod\":401}".into(),
        };

        assert!(unavailable.is_transport());
        assert!(unavailable.is_retryable());
        assert!(unauthorized.is_transport());
        assert!(!unauthorized.is_retryable());
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn every_variant_shows_the_same_user_message() {
        let err = FetchError::Timeout(Duration::from_millis(5));
        assert_eq!(err.user_message(), "Failed to fetch weather data");
        assert!(err.to_string().contains("did not respond"));
    }
}
