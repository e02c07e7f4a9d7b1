use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_scout::workflows::screening::{screening_router, ScreeningService, SessionExporter};

pub(crate) fn with_screening_routes<E>(service: Arc<ScreeningService<E>>) -> axum::Router
where
    E: SessionExporter + 'static,
{
    screening_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use talent_scout::config::ScreeningConfig;
    use talent_scout::workflows::screening::{ExportFormat, FileExporter, QuestionChain};
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let service = ScreeningService::new(
            Arc::new(QuestionChain::offline()),
            Arc::new(FileExporter::new(std::env::temp_dir().join("talent-scout-routes"))),
            ScreeningConfig::default(),
            ExportFormat::Json,
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_screening_routes(Arc::new(service)).layer(Extension(state))
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
    }

    #[tokio::test]
    async fn healthcheck_is_always_ok() {
        let (status, body) = get(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"ok\""));
    }

    #[tokio::test]
    async fn readiness_tracks_the_startup_flag() {
        let (status, body) = get(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("initializing"));

        let (status, _) = get(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let router = app(true);
        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn screening_routes_are_mounted() {
        let router = app(true);
        let response = router
            .oneshot(
                Request::post("/api/v1/screening/sessions")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
