//! Error types and handling for the trip planner

use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// External service communication errors (geocoding, routing, POI lookups)
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A lookup succeeded but found nothing
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Durable store errors (recent searches, favorites, response cache)
    #[error("Store error: {message}")]
    Store { message: String },

    /// Document export errors
    #[error("Export error: {message}")]
    Export { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TripPlannerError::Api { .. } => {
                "Could not reach the map services. Check your connection and try again."
                    .to_string()
            }
            TripPlannerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripPlannerError::NotFound { message } => message.clone(),
            TripPlannerError::Store { .. } => {
                "Saved places could not be updated. You may need to clear local data.".to_string()
            }
            TripPlannerError::Export { .. } => {
                "The itinerary could not be exported.".to_string()
            }
            TripPlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripPlannerError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest_middleware::Error> for TripPlannerError {
    fn from(err: reqwest_middleware::Error) -> Self {
        TripPlannerError::api(err.to_string())
    }
}

impl From<reqwest::Error> for TripPlannerError {
    fn from(err: reqwest::Error) -> Self {
        TripPlannerError::api(err.to_string())
    }
}

impl From<serde_json::Error> for TripPlannerError {
    fn from(err: serde_json::Error) -> Self {
        TripPlannerError::general(format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TripPlannerError::config("missing base url");
        assert!(matches!(config_err, TripPlannerError::Config { .. }));

        let api_err = TripPlannerError::api("connection failed");
        assert!(matches!(api_err, TripPlannerError::Api { .. }));

        let validation_err = TripPlannerError::validation("trip duration must be 1-7 days");
        assert!(matches!(validation_err, TripPlannerError::Validation { .. }));

        let not_found = TripPlannerError::not_found("No results for \"Atlantis\"");
        assert!(matches!(not_found, TripPlannerError::NotFound { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TripPlannerError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = TripPlannerError::api("test");
        assert!(api_err.user_message().contains("Could not reach"));

        let validation_err = TripPlannerError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let not_found = TripPlannerError::not_found("No results for \"x\"");
        assert_eq!(not_found.user_message(), "No results for \"x\"");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TripPlannerError = io_err.into();
        assert!(matches!(err, TripPlannerError::Io { .. }));
    }
}
