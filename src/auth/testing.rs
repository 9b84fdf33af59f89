// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token fixtures for unit tests.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;

use super::jwks::{KeySet, SigningKey};
use super::IdentityProvider;

pub const DOMAIN: &str = "example.auth0.com";
pub const ISSUER: &str = "https://example.auth0.com/";
pub const AUDIENCE: &str = "capstone";
pub const KID: &str = "test-key";

const SIGNING_KEY_PEM: &str = include_str!("../../tests/fixtures/signing_key.pem");
const SIGNING_KEY_MODULUS: &str = include_str!("../../tests/fixtures/signing_key.n");
const ROGUE_KEY_PEM: &str = include_str!("../../tests/fixtures/rogue_key.pem");

pub enum Signer {
    /// The key published in [`key_set`]
    Published,
    /// A key the provider never published
    Rogue,
}

pub struct TokenSpec {
    pub kid: Option<String>,
    pub alg: Algorithm,
    pub signer: Signer,
    pub claims: Value,
}

impl TokenSpec {
    /// An unexpired token for the test provider granting `permissions`.
    pub fn valid(permissions: &[&str]) -> Self {
        Self {
            kid: Some(KID.to_string()),
            alg: Algorithm::RS256,
            signer: Signer::Published,
            claims: serde_json::json!({
                "iss": ISSUER,
                "sub": "auth0|tester",
                "aud": AUDIENCE,
                "iat": now(),
                "exp": now() + 3600,
                "permissions": permissions,
            }),
        }
    }

    /// Same as [`TokenSpec::valid`] without a `permissions` claim.
    pub fn without_permissions() -> Self {
        let mut spec = Self::valid(&[]);
        if let Some(claims) = spec.claims.as_object_mut() {
            claims.remove("permissions");
        }
        spec
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn provider() -> IdentityProvider {
    IdentityProvider::new(DOMAIN, AUDIENCE, vec![Algorithm::RS256])
}

pub fn signing_key() -> SigningKey {
    SigningKey {
        kty: "RSA".to_string(),
        kid: Some(KID.to_string()),
        key_use: Some("sig".to_string()),
        n: Some(SIGNING_KEY_MODULUS.trim().to_string()),
        e: Some("AQAB".to_string()),
    }
}

pub fn key_set() -> KeySet {
    KeySet {
        keys: vec![signing_key()],
    }
}

pub fn sign(spec: &TokenSpec) -> String {
    let pem = match spec.signer {
        Signer::Published => SIGNING_KEY_PEM,
        Signer::Rogue => ROGUE_KEY_PEM,
    };
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    let mut header = Header::new(spec.alg);
    header.kid = spec.kid.clone();
    encode(&header, &spec.claims, &key).unwrap()
}

/// A token claiming `alg: none` with an empty signature.
pub fn unsigned_token(claims: &Value) -> String {
    let header = serde_json::json!({ "alg": "none", "typ": "JWT", "kid": KID });
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
