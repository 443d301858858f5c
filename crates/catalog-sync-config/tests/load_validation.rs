//! Config load validation tests for catalog-sync-config.
// catalog-sync-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, parse).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use catalog_sync_config::CatalogSyncConfig;
use catalog_sync_config::ConfigError;
use catalog_sync_config::StoreType;
use tempfile::NamedTempFile;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<CatalogSyncConfig, ConfigError>, needle: &str) -> TestResult {
    common::assert_invalid(result.map(|_| ()), needle)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(CatalogSyncConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(CatalogSyncConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(CatalogSyncConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(CatalogSyncConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_sections() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[telemetry]\nenabled = true\n").map_err(|err| err.to_string())?;
    assert_invalid(CatalogSyncConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_reads_full_config() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let seed_path = dir.path().join("seed.json");
    std::fs::write(
        &seed_path,
        r#"{"locales": [{"code": "en_US", "enabled": true}]}"#,
    )
    .map_err(|err| err.to_string())?;
    let config_path = dir.path().join("catalog-sync.toml");
    let content = format!(
        r#"
[server]
bind = "127.0.0.1:9090"
max_body_bytes = 65536

[[server.auth.tokens]]
token = "erp-token"
owner = "erp_connection"
scopes = ["read_catalogs", "read_products"]

[store]
type = "sqlite"
path = "{store}"
journal_mode = "wal"
sync_mode = "normal"

[pagination]
default_limit = 50
max_limit = 200
scan_batch_size = 64

[reference_cache]
ttl_ms = 1000

[audit]
type = "none"

[reference_data]
seed_path = "{seed}"

[[permissions.grants]]
owner = "erp_connection"
categories = ["master"]
"#,
        store = dir.path().join("catalogs.sqlite").display(),
        seed = seed_path.display(),
    );
    std::fs::write(&config_path, content).map_err(|err| err.to_string())?;

    let config = CatalogSyncConfig::load(Some(&config_path)).map_err(|err| err.to_string())?;
    if config.store.store_type != StoreType::Sqlite {
        return Err("expected sqlite store".to_string());
    }
    if config.pagination.limits().max_limit != 200 {
        return Err("expected max_limit 200".to_string());
    }
    let seed = config.reference_data.load_seed().map_err(|err| err.to_string())?;
    match seed {
        Some(seed) if seed.locales.len() == 1 => Ok(()),
        other => Err(format!("unexpected seed: {}", other.is_some())),
    }
}
