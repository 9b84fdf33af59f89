// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authorization gate run before every protected operation.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::header::{bearer_token, bearer_token_from_headers};
use super::jwks::JwksManager;
use super::permissions::check_permission;
use super::verifier::{unverified_kid, verify_with_key};
use super::{AuthError, Claims, IdentityProvider};

/// Extract, verify, then authorize.
///
/// The gate owns no request state. Clones share the provider configuration
/// and the key cache.
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<IdentityProvider>,
    jwks: JwksManager,
}

impl AuthGate {
    pub fn new(provider: IdentityProvider, jwks: JwksManager) -> Self {
        Self {
            provider: Arc::new(provider),
            jwks,
        }
    }

    /// Gate that fetches keys from the provider's well-known JWKS URL.
    pub fn for_provider(provider: IdentityProvider) -> Result<Self, url::ParseError> {
        let jwks = JwksManager::new(provider.jwks_url()?.to_string());
        Ok(Self::new(provider, jwks))
    }

    pub fn provider(&self) -> &IdentityProvider {
        &self.provider
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Verify a bearer token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = unverified_kid(token)?;
        let key = self.jwks.find_key(&kid).await?;
        verify_with_key(token, &key, &self.provider)
    }

    /// Authorize a request given its raw `Authorization` header value.
    pub async fn authorize_header(
        &self,
        permission: &str,
        header: Option<&str>,
    ) -> Result<Claims, AuthError> {
        let result = self.run(permission, bearer_token(header)).await;
        log_outcome(permission, &result);
        result
    }

    /// Authorize a request given its headers.
    pub async fn authorize(
        &self,
        permission: &str,
        headers: &HeaderMap,
    ) -> Result<Claims, AuthError> {
        let result = self.run(permission, bearer_token_from_headers(headers)).await;
        log_outcome(permission, &result);
        result
    }

    async fn run(
        &self,
        permission: &str,
        token: Result<&str, AuthError>,
    ) -> Result<Claims, AuthError> {
        let claims = self.verify(token?).await?;
        check_permission(permission, &claims)?;
        Ok(claims)
    }
}

fn log_outcome(permission: &str, result: &Result<Claims, AuthError>) {
    match result {
        Ok(claims) => tracing::debug!(
            target: "auth.gate",
            permission,
            sub = claims.sub.as_deref().unwrap_or_default(),
            "Request authorized"
        ),
        Err(AuthError::KeySetUnavailable { reason }) => tracing::error!(
            target: "auth.gate",
            permission,
            reason = %reason,
            "Authorization aborted, signing keys unavailable"
        ),
        Err(e) => tracing::warn!(
            target: "auth.gate",
            permission,
            kind = e.kind(),
            status = e.status_code().as_u16(),
            "Authorization failed"
        ),
    }
}
