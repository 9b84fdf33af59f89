// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment (and a `.env` file, if
//! present) once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_DOMAIN` | Identity-provider host; issuer is `https://<domain>/` | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `ALGORITHMS` | Comma-separated signature algorithm allow-list | `RS256` |
//! | `JWKS_CACHE_TTL_SECONDS` | How long a fetched key set is trusted | `300` |
//! | `JWKS_MIN_REFRESH_SECONDS` | Floor between refetches for unknown key IDs | `30` |
//! | `JWKS_TIMEOUT_SECONDS` | Timeout for one JWKS request | `10` |
//! | `TOKEN_LEEWAY_SECONDS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::auth::{AuthGate, IdentityProvider, JwksManager};

pub const AUTH_DOMAIN_ENV: &str = "AUTH_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const ALGORITHMS_ENV: &str = "ALGORITHMS";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECONDS";
pub const JWKS_MIN_REFRESH_ENV: &str = "JWKS_MIN_REFRESH_SECONDS";
pub const JWKS_TIMEOUT_ENV: &str = "JWKS_TIMEOUT_SECONDS";
pub const TOKEN_LEEWAY_ENV: &str = "TOKEN_LEEWAY_SECONDS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,

    pub auth_domain: String,
    pub api_audience: String,
    pub algorithms: Vec<Algorithm>,
    pub token_leeway_seconds: u64,

    pub jwks_cache_ttl: Duration,
    pub jwks_min_refresh: Duration,
    pub jwks_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth_domain = get(AUTH_DOMAIN_ENV)
            .ok_or(ConfigError::Missing(AUTH_DOMAIN_ENV))
            .and_then(|raw| normalize_domain(&raw))?;

        let api_audience = get(API_AUDIENCE_ENV)
            .map(|v| v.trim().to_string())
            .ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;

        let algorithms = match get(ALGORITHMS_ENV) {
            Some(raw) => parse_algorithms(&raw)?,
            None => vec![Algorithm::RS256],
        };

        let seconds = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::invalid(key, e.to_string())),
                None => Ok(default),
            }
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    LOG_FORMAT_ENV,
                    format!("expected json or pretty, got {other}"),
                ))
            }
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e.to_string()))?,
            None => 8080,
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_format,
            auth_domain,
            api_audience,
            algorithms,
            token_leeway_seconds: seconds(TOKEN_LEEWAY_ENV, 0)?,
            jwks_cache_ttl: Duration::from_secs(seconds(JWKS_CACHE_TTL_ENV, 300)?),
            jwks_min_refresh: Duration::from_secs(seconds(JWKS_MIN_REFRESH_ENV, 30)?),
            jwks_timeout: Duration::from_secs(seconds(JWKS_TIMEOUT_ENV, 10)?),
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid(HOST_ENV, e.to_string()))
    }

    pub fn identity_provider(&self) -> IdentityProvider {
        IdentityProvider::new(&self.auth_domain, &self.api_audience, self.algorithms.clone())
            .with_leeway(self.token_leeway_seconds)
    }

    /// Build the shared gate, with its key cache tuned from this config.
    pub fn auth_gate(&self) -> Result<AuthGate, ConfigError> {
        let provider = self.identity_provider();
        let jwks_url = provider
            .jwks_url()
            .map_err(|e| ConfigError::invalid(AUTH_DOMAIN_ENV, e.to_string()))?;
        let jwks = JwksManager::new(jwks_url.to_string())
            .with_cache_ttl(self.jwks_cache_ttl)
            .with_min_refresh_interval(self.jwks_min_refresh)
            .with_timeout(self.jwks_timeout);
        Ok(AuthGate::new(provider, jwks))
    }
}

/// Reduce `example.auth0.com`, `https://example.auth0.com/` and similar to
/// the bare host (with port, if one is given).
fn normalize_domain(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate)
        .map_err(|e| ConfigError::invalid(AUTH_DOMAIN_ENV, e.to_string()))?;

    if url.path() != "/" || url.query().is_some() {
        return Err(ConfigError::invalid(AUTH_DOMAIN_ENV, "expected a host without a path"));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::invalid(AUTH_DOMAIN_ENV, "expected a host"))?;

    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Parse `RS256`, `RS256,PS256` or `["RS256"]`.
///
/// Only RSA signature algorithms are accepted because the published keys
/// are RSA keys. `none` and HMAC algorithms are rejected outright.
fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim_matches(|c| matches!(c, '[' | ']' | '"' | '\'')))
        .filter(|s| !s.is_empty())
    {
        let alg = Algorithm::from_str(name).map_err(|_| {
            ConfigError::invalid(ALGORITHMS_ENV, format!("unknown algorithm {name}"))
        })?;
        match alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => {
                if !algorithms.contains(&alg) {
                    algorithms.push(alg);
                }
            }
            other => {
                return Err(ConfigError::invalid(
                    ALGORITHMS_ENV,
                    format!("{other:?} cannot verify RSA key set signatures"),
                ))
            }
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::invalid(ALGORITHMS_ENV, "no algorithms listed"));
    }
    Ok(algorithms)
}
