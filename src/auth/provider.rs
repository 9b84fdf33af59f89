// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust relationship with the identity provider.

use jsonwebtoken::Algorithm;
use url::Url;

/// Issuer, audience and algorithm allow-list for one identity provider.
///
/// Built once at startup and shared read-only by every verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProvider {
    domain: String,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl IdentityProvider {
    /// Create a provider for `domain` (a bare host such as `example.auth0.com`).
    ///
    /// The expected issuer is `https://<domain>/`.
    pub fn new(
        domain: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        let domain = domain.into();
        Self {
            issuer: format!("https://{domain}/"),
            domain,
            audience: audience.into(),
            algorithms,
            leeway: 0,
        }
    }

    /// Accept tokens up to `seconds` past their expiry.
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    /// Override the expected issuer.
    ///
    /// Integration tests serve the key set over plain HTTP from a mock
    /// server, so both the issuer and the JWKS URL differ from production.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn leeway(&self) -> u64 {
        self.leeway
    }

    /// Well-known JWKS location for this provider.
    pub fn jwks_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("https://{}/", self.domain))?.join(".well-known/jwks.json")
    }
}
