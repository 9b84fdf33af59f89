// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures: an identity provider backed by a mocked JWKS endpoint
//! and RSA keys to sign tokens with.

#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rbac_gate::auth::{AuthGate, IdentityProvider, JwksManager};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOMAIN: &str = "example.auth0.com";
pub const ISSUER: &str = "https://example.auth0.com/";
pub const AUDIENCE: &str = "capstone";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
const SIGNING_KEY_MODULUS: &str = include_str!("../fixtures/signing_key.n");
const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");
const ROGUE_KEY_MODULUS: &str = include_str!("../fixtures/rogue_key.n");

/// A key pair the mocked provider can publish.
#[derive(Clone, Copy)]
pub enum TestKey {
    Primary,
    Secondary,
}

impl TestKey {
    fn pem(self) -> &'static str {
        match self {
            TestKey::Primary => SIGNING_KEY_PEM,
            TestKey::Secondary => ROGUE_KEY_PEM,
        }
    }

    fn modulus(self) -> &'static str {
        match self {
            TestKey::Primary => SIGNING_KEY_MODULUS.trim(),
            TestKey::Secondary => ROGUE_KEY_MODULUS.trim(),
        }
    }

    /// JWK entry publishing this key under `kid`.
    pub fn jwk(self, kid: &str) -> Value {
        json!({
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": self.modulus(),
            "e": "AQAB"
        })
    }

    /// Sign `claims` with this key, announcing `kid` in the header.
    pub fn sign(self, kid: &str, claims: &Value) -> String {
        let key = EncodingKey::from_rsa_pem(self.pem().as_bytes()).expect("fixture PEM is valid");
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &key).expect("Failed to sign token")
    }
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Unexpired claims for the test provider granting `permissions`.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "sub": "auth0|5f1c",
        "aud": AUDIENCE,
        "iat": now(),
        "exp": now() + 3600,
        "permissions": permissions,
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Serve `keys` from the mock JWKS endpoint.
pub async fn publish(server: &MockServer, keys: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
        .mount(server)
        .await;
}

/// Gate trusting the test provider, fetching keys from `server`.
///
/// Unknown-kid refetches are not rate limited so rotation can be observed.
pub fn gate(server: &MockServer) -> AuthGate {
    let provider = IdentityProvider::new(DOMAIN, AUDIENCE, vec![Algorithm::RS256]);
    let jwks = JwksManager::new(format!("{}{JWKS_PATH}", server.uri()))
        .with_min_refresh_interval(Duration::ZERO)
        .with_timeout(Duration::from_secs(2));
    AuthGate::new(provider, jwks)
}
