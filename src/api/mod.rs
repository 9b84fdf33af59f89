// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ApiError, error::ErrorBody, state::AppState};

pub mod health;

/// Assemble the service router.
///
/// `resources` carries the caller's protected routes (already wrapped with
/// [`crate::auth::protect`]) and is mounted under `/v1`. The crate itself
/// defines no resources; pass `Router::new()` to serve probes and docs only.
///
/// A known path hit with the wrong method answers a JSON 405, an unknown
/// path a JSON 404.
pub fn router(state: AppState, resources: Router<AppState>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(health_routes)
        .nest("/v1", resources)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health, health::liveness, health::readiness),
    components(schemas(
        health::ReadyResponse,
        health::HealthChecks,
        health::HealthResponse,
        ErrorBody
    )),
    tags(
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{testing, AuthGate, JwksManager};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(AuthGate::new(
            testing::provider(),
            JwksManager::new("http://127.0.0.1:9/.well-known/jwks.json"),
        ))
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(state(), Router::new());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_is_plain_text() {
        let response = router(state(), Router::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Up and Running!");
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let response = router(state(), Router::new())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["status_code"], 404);
    }

    #[tokio::test]
    async fn wrong_method_is_json_405() {
        let response = router(state(), Router::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "method not allowed");
        assert_eq!(body["status_code"], 405);
    }

    #[tokio::test]
    async fn openapi_lists_health_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health/ready"));
    }
}
