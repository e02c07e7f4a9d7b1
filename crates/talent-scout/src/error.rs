use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::screening::{ConversationError, ScreeningServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Screening(ScreeningServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Screening(err) => write!(f, "screening error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Screening(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Screening(ScreeningServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Screening(ScreeningServiceError::Conversation(
                ConversationError::FatalConfiguration(_),
            )) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Screening(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ScreeningServiceError> for AppError {
    fn from(value: ScreeningServiceError) -> Self {
        Self::Screening(value)
    }
}

impl From<ConversationError> for AppError {
    fn from(value: ConversationError) -> Self {
        Self::Screening(ScreeningServiceError::Conversation(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::{QuestionsExhausted, SessionId};

    #[test]
    fn screening_errors_map_to_http_status() {
        let missing = AppError::from(ScreeningServiceError::NotFound(SessionId(
            "session-000404".to_string(),
        )));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let exhausted = AppError::from(ConversationError::FatalConfiguration(QuestionsExhausted {
            technology: "Rust".to_string(),
        }));
        assert_eq!(
            exhausted.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.to_string(), "io error: disk");
        assert_eq!(
            io.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
