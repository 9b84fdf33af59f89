// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum integration for the authorization gate.
//!
//! Protect routes with [`protect`] and read the verified claims in handlers
//! with the [`Authorized`] extractor:
//!
//! ```rust,ignore
//! let actors = Router::new().route("/actors", get(list_actors));
//! let actors = protect(actors, RequirePermission::new(state.gate.clone(), "get:actors"));
//!
//! async fn list_actors(Authorized(claims): Authorized) -> impl IntoResponse {
//!     // claims passed every check, including `get:actors`
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use super::{AuthGate, Claims};
use crate::error::ApiError;

/// Middleware state: the shared gate plus the permission one route requires.
///
/// An empty permission only requires a valid token.
#[derive(Clone)]
pub struct RequirePermission {
    gate: AuthGate,
    permission: Arc<str>,
}

impl RequirePermission {
    pub fn new(gate: AuthGate, permission: impl Into<Arc<str>>) -> Self {
        Self {
            gate,
            permission: permission.into(),
        }
    }

    /// Only require authentication.
    pub fn authenticated(gate: AuthGate) -> Self {
        Self::new(gate, "")
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }
}

/// Run the gate on every route of `router`.
///
/// Uses `route_layer`, so unmatched paths still fall through to the 404
/// fallback instead of answering 401.
pub fn protect<S>(router: Router<S>, guard: RequirePermission) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(guard, require_permission))
}

/// Authorization middleware function.
///
/// Stores the verified [`Claims`] in request extensions on success.
pub async fn require_permission(
    State(guard): State<RequirePermission>,
    mut request: Request,
    next: Next,
) -> Response {
    match guard
        .gate
        .authorize(&guard.permission, request.headers())
        .await
    {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extractor for claims verified by [`require_permission`].
///
/// Fails with 500 on a route the middleware does not cover, so a missing
/// layer never degrades into an unauthenticated handler.
pub struct Authorized(pub Claims);

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Claims>() {
            Some(claims) => Ok(Authorized(claims.clone())),
            None => {
                tracing::error!(
                    target: "auth.gate",
                    path = %parts.uri.path(),
                    "Authorized extractor used on a route without the permission layer"
                );
                Err(ApiError::internal("Authorization is not configured for this route."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{self, TokenSpec};
    use crate::auth::JwksManager;
    use axum::{body::Body, http::StatusCode, routing::get, Json};
    use tower::ServiceExt;

    fn gate() -> AuthGate {
        // Nothing listens here; these tests never reach the key fetch.
        AuthGate::new(
            testing::provider(),
            JwksManager::new("http://127.0.0.1:9/.well-known/jwks.json"),
        )
    }

    async fn echo(Authorized(claims): Authorized) -> Json<Claims> {
        Json(claims)
    }

    #[test]
    fn authenticated_requires_no_permission() {
        assert_eq!(RequirePermission::authenticated(gate()).permission(), "");
        assert_eq!(
            RequirePermission::new(gate(), "get:actors").permission(),
            "get:actors"
        );
    }

    #[tokio::test]
    async fn rejects_without_header() {
        let app = protect(
            Router::new().route("/actors", get(echo)),
            RequirePermission::new(gate(), "get:actors"),
        );

        let response = app
            .oneshot(axum::http::Request::builder().uri("/actors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn extractor_reads_claims_from_extensions() {
        let claims: Claims =
            serde_json::from_value(TokenSpec::valid(&["get:actors"]).claims).unwrap();
        let mut parts = axum::http::Request::builder()
            .uri("/actors")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.extensions.insert(claims.clone());

        let Authorized(extracted) = Authorized::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, claims);
    }

    #[tokio::test]
    async fn extractor_without_layer_is_internal_error() {
        let app: Router = Router::new().route("/actors", get(echo));

        let response = app
            .oneshot(axum::http::Request::builder().uri("/actors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
