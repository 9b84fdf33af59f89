// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! rbac-gate - Role-Based API Access Control
//!
//! Authenticates requests carrying identity-provider issued bearer JWTs,
//! verifies them against the provider's published JWKS, and authorizes them
//! against a per-route permission string.
//!
//! ## Modules
//!
//! - `auth` - Token extraction, JWKS cache, verification, permission gate
//! - `api` - HTTP router and health probes (Axum)
//! - `config` - Environment configuration
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
