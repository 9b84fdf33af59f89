// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT signature and claim verification.
//!
//! ## Security
//!
//! - The header's `alg` must be in the provider's allow-list; `none` and
//!   symmetric algorithms never reach signature verification
//! - `exp`, `iss` and `aud` are required claims
//! - Claims are only deserialized for the caller after every check passed

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use serde_json::{Map, Value};

use super::jwks::{KeySet, SigningKey};
use super::{AuthError, Claims, IdentityProvider};

/// Read the `kid` from the token header without verifying anything.
pub fn unverified_kid(token: &str) -> Result<String, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::TokenUnparseable)?;
    header.kid.ok_or(AuthError::MalformedToken)
}

/// First key in `keys` published under `kid`.
pub fn select_key<'a>(keys: &'a KeySet, kid: &str) -> Result<&'a SigningKey, AuthError> {
    keys.find(kid).ok_or(AuthError::SigningKeyNotFound)
}

/// Verify `token` against an already fetched key set.
pub fn verify_token(
    token: &str,
    keys: &KeySet,
    provider: &IdentityProvider,
) -> Result<Claims, AuthError> {
    let kid = unverified_kid(token)?;
    let key = select_key(keys, &kid)?;
    verify_with_key(token, key, provider)
}

/// Verify `token` with one published key.
///
/// Checks the signature with the header's algorithm (which must be
/// allow-listed), then issuer, audience, expiry and not-before.
pub fn verify_with_key(
    token: &str,
    key: &SigningKey,
    provider: &IdentityProvider,
) -> Result<Claims, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::TokenUnparseable)?;
    if !provider.algorithms().contains(&header.alg) {
        tracing::warn!(
            target: "auth.verifier",
            alg = ?header.alg,
            "Token algorithm is not allowed"
        );
        return Err(AuthError::ClaimsInvalid);
    }

    let decoding_key = key.decoding_key()?;

    let mut validation = Validation::new(header.alg);
    validation.set_issuer(&[provider.issuer()]);
    validation.set_audience(&[provider.audience()]);
    validation.set_required_spec_claims(&["exp", "iss", "aud"]);
    validation.validate_nbf = true;
    validation.leeway = provider.leeway();

    let payload = decode::<Map<String, Value>>(token, &decoding_key, &validation)
        .map_err(|e| classify(e.kind()))?
        .claims;

    serde_json::from_value(Value::Object(payload)).map_err(|_| AuthError::TokenUnparseable)
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimsInvalid,
        _ => AuthError::TokenUnparseable,
    }
}
