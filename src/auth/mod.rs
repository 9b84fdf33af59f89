// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Bearer JWT verification and permission checks for identity-provider
//! issued access tokens.
//!
//! ## Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>`
//! 2. The gate:
//!    - Parses the bearer token out of the header
//!    - Reads the unverified `kid` and looks it up in the provider's JWKS
//!    - Verifies signature, issuer, audience and expiry
//!    - Checks the route's required permission against `permissions`
//! 3. The handler receives the verified [`Claims`]
//!
//! ## Security
//!
//! - Only allow-listed asymmetric algorithms are accepted
//! - JWKS is cached with TTL and refetched when an unknown `kid` shows up
//! - No clock skew tolerance unless configured

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod header;
pub mod jwks;
pub mod permissions;
pub mod provider;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::{protect, Authorized, RequirePermission};
pub use gate::AuthGate;
pub use jwks::{JwksManager, KeySet, SigningKey};
pub use provider::IdentityProvider;
