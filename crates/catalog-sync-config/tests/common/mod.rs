// catalog-sync-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Fixtures
// Description: Shared configuration builders for config validation tests.
// ============================================================================

#![allow(dead_code, reason = "Not every test binary uses every fixture.")]

use catalog_sync_config::AuthTokenConfig;
use catalog_sync_config::CatalogSyncConfig;
use catalog_sync_config::ConfigError;

/// Minimal valid configuration with one full-scope token.
pub const MINIMAL_TOML: &str = r#"
[server]
bind = "127.0.0.1:8080"

[[server.auth.tokens]]
token = "erp-token"
owner = "erp_connection"
scopes = ["read_catalogs", "read_products", "write_catalogs"]
"#;

pub fn minimal_config() -> Result<CatalogSyncConfig, ConfigError> {
    CatalogSyncConfig::parse(MINIMAL_TOML)
}

pub fn token(token: &str, owner: &str, scopes: &[&str]) -> AuthTokenConfig {
    AuthTokenConfig {
        token: token.to_string(),
        owner: owner.to_string(),
        scopes: scopes.iter().map(ToString::to_string).collect(),
    }
}

pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}
