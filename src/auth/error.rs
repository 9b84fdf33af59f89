// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::error::ErrorBody;

/// Every way an authorization check can fail.
///
/// The `Display` text is the client-facing message. It is rendered as-is in
/// the JSON error body, so it never carries token material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Authorization header is expected.")]
    AuthorizationHeaderMissing,
    /// Scheme word is not `Bearer`
    #[error("Authorization header must start with \"Bearer\".")]
    MalformedScheme,
    /// Header carries only the scheme word
    #[error("Token not found.")]
    TokenMissing,
    /// Header has more than two parts or is not readable text
    #[error("Authorization header must be Bearer <token>.")]
    MalformedHeader,
    /// JWT header has no `kid`
    #[error("Authorization malformed.")]
    MalformedToken,
    /// No published key matches the token's `kid`
    #[error("Unable to find the appropriate key.")]
    SigningKeyNotFound,
    /// Bad signature, disallowed algorithm, or issuer/audience mismatch
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    ClaimsInvalid,
    /// `exp` is in the past
    #[error("Token expired.")]
    TokenExpired,
    /// Token could not be decoded at all
    #[error("Unable to parse authentication token.")]
    TokenUnparseable,
    /// Claims have no `permissions` collection
    #[error("Permissions not included in JWT.")]
    PermissionsClaimMissing,
    /// Required permission absent from the claims
    #[error("Permission not found.")]
    PermissionDenied,
    /// The identity provider's key set could not be loaded
    #[error("Unable to load signing keys from the identity provider.")]
    KeySetUnavailable { reason: String },
}

impl AuthError {
    /// Stable machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::AuthorizationHeaderMissing => "authorization_header_missing",
            AuthError::MalformedScheme => "malformed_scheme",
            AuthError::TokenMissing => "token_missing",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::SigningKeyNotFound => "signing_key_not_found",
            AuthError::ClaimsInvalid => "claims_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenUnparseable => "token_unparseable",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::PermissionDenied => "permission_denied",
            AuthError::KeySetUnavailable { .. } => "key_set_unavailable",
        }
    }

    /// HTTP status the caller should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthorizationHeaderMissing
            | AuthError::MalformedScheme
            | AuthError::TokenMissing
            | AuthError::MalformedHeader
            | AuthError::MalformedToken
            | AuthError::ClaimsInvalid
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::SigningKeyNotFound | AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::TokenUnparseable | AuthError::PermissionsClaimMissing => {
                StatusCode::BAD_REQUEST
            }
            AuthError::KeySetUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub(crate) fn key_set_unavailable(reason: impl Into<String>) -> Self {
        AuthError::KeySetUnavailable {
            reason: reason.into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorBody::new(status, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_header_renders_401_body() {
        let response = AuthError::AuthorizationHeaderMissing.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authorization header is expected.");
        assert_eq!(body["status_code"], 401);
    }

    #[tokio::test]
    async fn permission_denied_returns_403() {
        let response = AuthError::PermissionDenied.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn status_table() {
        let cases = [
            (AuthError::MalformedScheme, 401),
            (AuthError::TokenMissing, 401),
            (AuthError::MalformedHeader, 401),
            (AuthError::MalformedToken, 401),
            (AuthError::SigningKeyNotFound, 403),
            (AuthError::ClaimsInvalid, 401),
            (AuthError::TokenExpired, 401),
            (AuthError::TokenUnparseable, 400),
            (AuthError::PermissionsClaimMissing, 400),
            (AuthError::key_set_unavailable("timeout"), 503),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code().as_u16(), status, "{}", error.kind());
        }
    }

    #[test]
    fn key_set_reason_stays_out_of_message() {
        let error = AuthError::key_set_unavailable("dns error: example.auth0.com");
        assert!(!error.to_string().contains("dns"));
    }
}
