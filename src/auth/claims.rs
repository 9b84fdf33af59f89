// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified JWT claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a token whose signature, issuer, audience and expiry have
/// all been validated.
///
/// Only the verifier constructs this from a token. Claims the service does
/// not interpret (`gty`, `azp`, provider extensions) are kept in `extra` so
/// handlers see the full payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (`https://<domain>/`)
    pub iss: String,

    /// Audience, a string or an array of strings
    pub aud: Value,

    /// Expiration timestamp
    pub exp: i64,

    /// Subject (identity-provider user id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Granted permission strings such as `post:actor`.
    ///
    /// `None` when the provider did not include the claim at all, which is
    /// distinct from an empty grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Check whether `permission` was granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|granted| granted.iter().any(|p| p == permission))
    }
}
