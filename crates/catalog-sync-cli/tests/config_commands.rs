// catalog-sync-cli/tests/config_commands.rs
// ============================================================================
// Module: CLI Config Command Tests
// Description: Integration tests for `catalog-sync config validate`.
// Purpose: Ensure valid configs pass and invalid ones fail closed.
// Dependencies: catalog-sync-cli binary, tempfile
// ============================================================================

//! ## Overview
//! Runs the CLI binary for config validation against files in a temp dir.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn catalog_sync_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-sync"))
}

fn validate(config_path: &Path) -> Output {
    Command::new(catalog_sync_bin())
        .args(["config", "validate", "--config", config_path.to_string_lossy().as_ref()])
        .output()
        .expect("config validate")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn valid_config_with_seed_reports_counts() {
    let dir = TempDir::new().unwrap();
    let seed_path = dir.path().join("seed.json");
    fs::write(
        &seed_path,
        r#"{
  "attributes": [{ "code": "color", "type": "pim_catalog_simpleselect", "options": ["red"] }],
  "channels": [{ "code": "ecommerce", "locales": ["en_US"], "currencies": ["USD"] }],
  "locales": [{ "code": "en_US", "enabled": true }]
}"#,
    )
    .unwrap();
    let config_path = dir.path().join("catalog-sync.toml");
    let config = format!(
        r#"
[server]
bind = "127.0.0.1:0"

[[server.auth.tokens]]
token = "erp-token"
owner = "erp_connection"
scopes = ["read_catalogs"]

[reference_data]
seed_path = "{}"
"#,
        seed_path.to_string_lossy().replace('\\', "\\\\")
    );
    fs::write(&config_path, config).unwrap();

    let output = validate(&config_path);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Config valid."));
    assert!(stdout.contains("Reference seed: 1 attributes, 1 channels, 1 locales, 0 products."));
    assert!(output.stderr.is_empty());
}

#[test]
fn tokenless_config_warns_about_local_only_mode() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("catalog-sync.toml");
    fs::write(&config_path, "[server]\nbind = \"127.0.0.1:0\"\n").unwrap();

    let output = validate(&config_path);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("local-only"));
}

#[test]
fn non_loopback_bind_without_tokens_fails_closed() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("catalog-sync.toml");
    fs::write(&config_path, "[server]\nbind = \"0.0.0.0:8080\"\n").unwrap();

    let output = validate(&config_path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"));
    assert!(stderr.contains("non-loopback"));
}

#[test]
fn unknown_keys_and_missing_files_fail() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("catalog-sync.toml");
    fs::write(&config_path, "[server]\nbind = \"127.0.0.1:0\"\nport = 1\n").unwrap();
    assert!(!validate(&config_path).status.success());

    let output = validate(&dir.path().join("absent.toml"));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}
