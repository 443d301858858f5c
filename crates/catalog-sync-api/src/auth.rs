// catalog-sync-api/src/auth.rs
// ============================================================================
// Module: API Authentication
// Description: Bearer token authentication and scope checks.
// Purpose: Resolve each request to an owner and its granted scopes.
// Dependencies: catalog-sync-config, catalog-sync-core, sha2, thiserror
// ============================================================================

//! ## Overview
//! Tokens come from `[[server.auth.tokens]]` and are held only as sha256
//! fingerprints. A request presents `Authorization: Bearer <token>`; the
//! fingerprint selects the owner and scopes. With no tokens configured the
//! server runs local-only (config validation pins it to a loopback bind) and
//! every request acts as [`LOCAL_OWNER`] with every known scope.
//!
//! Security posture: missing or unknown credentials are rejected before any
//! catalog lookup; tokens never appear in errors or audit events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;

use catalog_sync_config::ServerAuthConfig;
use catalog_sync_core::KNOWN_SCOPES;
use catalog_sync_core::SyncCaller;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of an `Authorization` header.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

/// Owner assigned to requests served in local-only mode.
pub const LOCAL_OWNER: &str = "local";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authenticated request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Caller identity and scopes.
    pub caller: SyncCaller,
    /// Token fingerprint for bearer auth (hashed).
    pub token_fingerprint: Option<String>,
}

impl AuthContext {
    /// Checks that the caller holds every required scope.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] naming the first missing scope.
    pub fn require_scopes(&self, required: &[&str]) -> Result<(), AuthError> {
        match required.iter().find(|scope| !self.caller.scopes.contains(**scope)) {
            Some(scope) => Err(AuthError::Unauthorized(format!("scope {scope} is required"))),
            None => Ok(()),
        }
    }
}

/// Authentication or authorization errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing or invalid authentication.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Caller is authenticated but not authorized.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Owner and scopes bound to one token.
#[derive(Debug, Clone)]
struct TokenGrant {
    /// Owning connection code.
    owner: String,
    /// Granted scopes.
    scopes: Vec<String>,
}

// ============================================================================
// SECTION: Authenticator
// ============================================================================

/// Bearer token authenticator.
#[derive(Debug, Clone)]
pub struct BearerAuthenticator {
    /// Grants keyed by token fingerprint.
    grants: BTreeMap<String, TokenGrant>,
}

impl BearerAuthenticator {
    /// Builds an authenticator from server auth configuration.
    #[must_use]
    pub fn from_config(config: &ServerAuthConfig) -> Self {
        let grants = config
            .tokens
            .iter()
            .map(|entry| {
                (
                    token_fingerprint(&entry.token),
                    TokenGrant {
                        owner: entry.owner.clone(),
                        scopes: entry.scopes.clone(),
                    },
                )
            })
            .collect();
        Self {
            grants,
        }
    }

    /// Returns true when no tokens are configured.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.grants.is_empty()
    }

    /// Authenticates a request from its `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] when the header is missing,
    /// malformed, or carries an unknown token.
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<AuthContext, AuthError> {
        if self.is_local_only() {
            return Ok(AuthContext {
                caller: SyncCaller::new(LOCAL_OWNER, KNOWN_SCOPES),
                token_fingerprint: None,
            });
        }
        let token = parse_bearer_token(auth_header)?;
        let fingerprint = token_fingerprint(&token);
        let grant = self
            .grants
            .get(&fingerprint)
            .ok_or_else(|| AuthError::Unauthenticated("invalid bearer token".to_string()))?;
        Ok(AuthContext {
            caller: SyncCaller::new(grant.owner.as_str(), grant.scopes.iter().map(String::as_str)),
            token_fingerprint: Some(fingerprint),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the lowercase hex sha256 fingerprint of a token.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    Sha256::digest(token.as_bytes()).iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Extracts the token from a bearer `Authorization` header.
fn parse_bearer_token(auth_header: Option<&str>) -> Result<String, AuthError> {
    let header = auth_header
        .ok_or_else(|| AuthError::Unauthenticated("missing authorization".to_string()))?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated("authorization header too large".to_string()));
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap for clarity."
    )]

    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer_token(Some("bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer_token(Some("BEARER   abc  ")).unwrap(), "abc");
    }

    #[test]
    fn malformed_headers_are_unauthenticated() {
        for header in ["", "Bearer", "Bearer ", "Basic abc", "abc"] {
            assert!(matches!(
                parse_bearer_token(Some(header)),
                Err(AuthError::Unauthenticated(_))
            ));
        }
        let oversized = format!("Bearer {}", "a".repeat(MAX_AUTH_HEADER_BYTES));
        assert!(parse_bearer_token(Some(&oversized)).is_err());
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        assert_eq!(
            token_fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
