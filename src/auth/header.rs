// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `Authorization` header parsing.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Extract the bearer token from a raw `Authorization` header value.
///
/// The header is split on whitespace. The first part must be `bearer`
/// (any case) and exactly one token part must follow it. An empty or
/// blank value counts as a missing header.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::AuthorizationHeaderMissing)?;
    let mut parts = header.split_whitespace();

    let scheme = parts.next().ok_or(AuthError::AuthorizationHeaderMissing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedScheme);
    }

    let token = parts.next().ok_or(AuthError::TokenMissing)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

/// Extract the bearer token from request headers.
pub fn bearer_token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedHeader)?),
        None => None,
    };
    bearer_token(value)
}
