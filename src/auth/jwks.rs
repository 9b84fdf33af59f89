// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Cache behaviour
//!
//! - The key set is cached for a configurable TTL
//! - A `kid` missing from a cached set triggers one refetch, at most once per
//!   minimum refresh interval, to pick up provider key rotation
//! - Fetches are serialized; callers that waited on an in-flight fetch reuse
//!   its result
//! - A failed fetch is reported, stale keys are never served

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default floor between refetches caused by an unknown `kid`.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default timeout for one JWKS request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One published public key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SigningKey {
    /// Key type (`RSA` for the keys this service can use).
    pub kty: String,

    /// Key ID, matched against the token header's `kid`.
    #[serde(default)]
    pub kid: Option<String>,

    /// Key use (normally `sig`).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,
}

impl SigningKey {
    /// Build the verification key from the published RSA components.
    pub fn decoding_key(&self) -> Result<DecodingKey, AuthError> {
        if self.kty != "RSA" {
            return Err(AuthError::key_set_unavailable(format!(
                "unsupported key type {}",
                self.kty
            )));
        }
        let (Some(n), Some(e)) = (self.n.as_deref(), self.e.as_deref()) else {
            return Err(AuthError::key_set_unavailable(
                "RSA key is missing its modulus or exponent",
            ));
        };
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AuthError::key_set_unavailable(format!("invalid RSA key: {e}")))
    }
}

/// The provider's JWKS document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeySet {
    pub keys: Vec<SigningKey>,
}

impl KeySet {
    /// First key whose ID equals `kid`.
    ///
    /// Later keys with the same ID are never considered.
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    /// Key IDs that appear more than once.
    pub fn duplicate_kids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for kid in self.keys.iter().filter_map(|k| k.kid.as_deref()) {
            if !seen.insert(kid) && !duplicates.contains(&kid) {
                duplicates.push(kid);
            }
        }
        duplicates
    }
}

/// JWKS cache entry.
struct CacheEntry {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

/// JWKS manager with caching.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL
    jwks_url: String,
    /// Cache TTL
    cache_ttl: Duration,
    /// Floor between refetches caused by unknown key IDs
    min_refresh_interval: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Held while a fetch is in flight; records when the last fetch started
    refresh_lock: Arc<Mutex<Option<Instant>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL
    ///   (e.g., `https://example.auth0.com/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(None)),
            client: build_client(DEFAULT_FETCH_TIMEOUT),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create with a custom floor between unknown-`kid` refetches.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Create with a custom per-request fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Current key set, fetched if the cache is empty or expired.
    pub async fn key_set(&self) -> Result<Arc<KeySet>, AuthError> {
        if let Some(keys) = self.cached(|entry| self.is_fresh(entry)).await {
            tracing::debug!(target: "auth.jwks", "JWKS cache hit");
            return Ok(keys);
        }
        self.refresh_unless(|entry| self.is_fresh(entry)).await
    }

    /// Look up the signing key for `kid`.
    ///
    /// An unknown `kid` causes one refetch unless the cached set is younger
    /// than the minimum refresh interval.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn find_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        let keys = self.key_set().await?;
        if let Some(key) = keys.find(kid) {
            return Ok(key.clone());
        }

        tracing::debug!(target: "auth.jwks", kid = %kid, "Key not found in JWKS cache");
        let seen = Arc::clone(&keys);
        let keys = self
            .refresh_unless(|entry| {
                !Arc::ptr_eq(&entry.keys, &seen)
                    || entry.fetched_at.elapsed() < self.min_refresh_interval
            })
            .await?;

        match keys.find(kid) {
            Some(key) => Ok(key.clone()),
            None => {
                tracing::warn!(
                    target: "auth.jwks",
                    kid = %kid,
                    "Key not found in JWKS after refresh"
                );
                Err(AuthError::SigningKeyNotFound)
            }
        }
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.refresh_unless(|_| false).await.map(|_| ())
    }

    /// Make sure fresh keys are cached, for readiness checks.
    ///
    /// Does not contact the provider again if a fetch started within the
    /// minimum refresh interval; the cache state at that point decides.
    pub async fn ensure_available(&self) -> Result<(), AuthError> {
        if self.is_cached().await {
            return Ok(());
        }

        let mut last_fetch = self.refresh_lock.lock().await;
        if self.is_cached().await {
            return Ok(());
        }
        if last_fetch.is_some_and(|at| at.elapsed() < self.min_refresh_interval) {
            return Err(AuthError::key_set_unavailable(
                "no fresh JWKS and the last fetch was too recent to retry",
            ));
        }

        self.fetch_and_store(&mut last_fetch).await.map(|_| ())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached(|entry| self.is_fresh(entry)).await.is_some()
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.fetched_at.elapsed() < self.cache_ttl
    }

    async fn cached(&self, usable: impl Fn(&CacheEntry) -> bool) -> Option<Arc<KeySet>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| usable(entry))
            .map(|entry| Arc::clone(&entry.keys))
    }

    /// Fetch and store a new key set unless the cache satisfies `still_good`
    /// once the refresh lock is held.
    async fn refresh_unless(
        &self,
        still_good: impl Fn(&CacheEntry) -> bool,
    ) -> Result<Arc<KeySet>, AuthError> {
        let mut last_fetch = self.refresh_lock.lock().await;

        if let Some(keys) = self.cached(&still_good).await {
            return Ok(keys);
        }

        self.fetch_and_store(&mut last_fetch).await
    }

    /// Fetch a key set and replace the cache with it. The cache is left
    /// alone when the fetch fails.
    async fn fetch_and_store(
        &self,
        last_fetch: &mut Option<Instant>,
    ) -> Result<Arc<KeySet>, AuthError> {
        *last_fetch = Some(Instant::now());
        let keys = Arc::new(self.fetch_jwks().await?);

        let duplicates = keys.duplicate_kids();
        if !duplicates.is_empty() {
            tracing::warn!(
                target: "auth.jwks",
                kids = ?duplicates,
                "JWKS contains duplicate key IDs, the first entry of each is used"
            );
        }
        tracing::info!(target: "auth.jwks", key_count = keys.keys.len(), "JWKS cache refreshed");

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<KeySet, AuthError> {
        tracing::debug!(target: "auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let response = self.client.get(&self.jwks_url).send().await.map_err(|e| {
            tracing::error!(target: "auth.jwks", error = %e, "Failed to fetch JWKS");
            AuthError::key_set_unavailable(e.to_string())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::key_set_unavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response.json::<KeySet>().await.map_err(|e| {
            tracing::error!(target: "auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::key_set_unavailable(e.to_string())
        })
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(
                target: "auth.jwks",
                error = %e,
                "Failed to build HTTP client with custom config, using defaults"
            );
            reqwest::Client::new()
        })
}
