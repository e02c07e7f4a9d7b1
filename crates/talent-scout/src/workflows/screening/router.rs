use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::conversation::ConversationError;
use super::domain::SessionId;
use super::export::SessionExporter;
use super::service::{ScreeningService, ScreeningServiceError};

/// Inbound chat turn.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Router builder exposing the screening session endpoints.
pub fn screening_router<E>(service: Arc<ScreeningService<E>>) -> Router
where
    E: SessionExporter + 'static,
{
    Router::new()
        .route("/api/v1/screening/sessions", post(start_handler::<E>))
        .route(
            "/api/v1/screening/sessions/:session_id",
            get(view_handler::<E>),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/messages",
            post(message_handler::<E>),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/reset",
            post(reset_handler::<E>),
        )
        .route(
            "/api/v1/screening/sessions/:session_id/report",
            get(report_handler::<E>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<E>(State(service): State<Arc<ScreeningService<E>>>) -> Response
where
    E: SessionExporter + 'static,
{
    let reply = service.start();
    (StatusCode::CREATED, axum::Json(reply)).into_response()
}

pub(crate) async fn view_handler<E>(
    State(service): State<Arc<ScreeningService<E>>>,
    Path(session_id): Path<String>,
) -> Response
where
    E: SessionExporter + 'static,
{
    match service.view(&SessionId(session_id)).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn message_handler<E>(
    State(service): State<Arc<ScreeningService<E>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<MessageRequest>,
) -> Response
where
    E: SessionExporter + 'static,
{
    match service.send(&SessionId(session_id), &request.message).await {
        Ok(reply) => (StatusCode::OK, axum::Json(reply)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler<E>(
    State(service): State<Arc<ScreeningService<E>>>,
    Path(session_id): Path<String>,
) -> Response
where
    E: SessionExporter + 'static,
{
    match service.reset(&SessionId(session_id)).await {
        Ok(reply) => (StatusCode::OK, axum::Json(reply)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<E>(
    State(service): State<Arc<ScreeningService<E>>>,
    Path(session_id): Path<String>,
) -> Response
where
    E: SessionExporter + 'static,
{
    match service.report(&SessionId(session_id)).await {
        Ok(report) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            report,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ScreeningServiceError) -> Response {
    let status = match &err {
        ScreeningServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ScreeningServiceError::Conversation(ConversationError::ExportFailed(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ScreeningServiceError::Conversation(ConversationError::FatalConfiguration(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
