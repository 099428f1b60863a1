//! Config loading and environment override tests for admin-gate-config.
// crates/admin-gate-config/tests/load_env.rs
// =============================================================================
// Module: Config Loading Tests
// Description: File resolution, size limits and environment overrides.
// Purpose: Ensure startup configuration is read once and predictably.
// =============================================================================

use std::fs;

use admin_gate_config::AdminGateConfig;
use admin_gate_config::ServerAuthMode;
use admin_gate_config::ServerTransport;
use admin_gate_core::CredentialKind;
use tempfile::TempDir;

mod common;

type TestResult = Result<(), String>;

fn write_config(dir: &TempDir, content: &str) -> Result<std::path::PathBuf, String> {
    let path = dir.path().join("admin-gate.toml");
    fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

#[test]
fn explicit_path_loads_and_validates() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&dir, common::MINIMAL_TOML)?;
    let config = AdminGateConfig::load_with_env(Some(&path), common::empty_env)
        .map_err(|err| err.to_string())?;
    if config.downstream.base_url != "https://shop.example.com" {
        return Err("base_url not normalized".to_string());
    }
    Ok(())
}

#[test]
fn env_var_names_config_path() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&dir, common::MINIMAL_TOML)?;
    let path_text = path.to_string_lossy().to_string();
    let lookup = common::env_from(&[("ADMIN_GATE_CONFIG", path_text.as_str())]);
    AdminGateConfig::load_with_env(None, lookup).map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn missing_explicit_path_is_io_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    match AdminGateConfig::load_with_env(Some(&path), common::empty_env) {
        Err(err) if err.to_string().contains("config io error") => Ok(()),
        Err(err) => Err(format!("unexpected error: {err}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

#[test]
fn oversized_file_rejected() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let padding = "#".repeat(1024 * 1024 + 1);
    let path = write_config(&dir, &padding)?;
    match AdminGateConfig::load_with_env(Some(&path), common::empty_env) {
        Err(err) if err.to_string().contains("size limit") => Ok(()),
        other => Err(format!("expected size limit error, got ok={}", other.is_ok())),
    }
}

#[test]
fn environment_overrides_file_values() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&dir, common::MINIMAL_TOML)?;
    let lookup = common::env_from(&[
        ("ADMIN_GATE_DOWNSTREAM_BASE_URL", "http://localhost:9000/"),
        ("ADMIN_GATE_DOWNSTREAM_AUTH_KIND", "Bearer"),
        ("ADMIN_GATE_DOWNSTREAM_SECRET", "sk_env"),
        ("ADMIN_GATE_CONFIRM_SECRET", "env-signing"),
        ("ADMIN_GATE_CONFIRM_TTL_SECONDS", "60"),
        ("ADMIN_GATE_TRANSPORT", "http"),
        ("ADMIN_GATE_BIND", "0.0.0.0:8787"),
        ("ADMIN_GATE_SERVER_BEARER_TOKEN", "mcp-key"),
    ]);
    let config =
        AdminGateConfig::load_with_env(Some(&path), lookup).map_err(|err| err.to_string())?;
    if config.downstream.base_url != "http://localhost:9000" {
        return Err("base_url override missing".to_string());
    }
    if config.downstream.auth_kind != CredentialKind::Bearer {
        return Err("auth kind override missing".to_string());
    }
    if config.confirm.signing_secret() != Some("env-signing") || config.confirm.ttl_seconds != 60 {
        return Err("confirm overrides missing".to_string());
    }
    if config.server.transport != ServerTransport::Http
        || config.server.auth_mode() != ServerAuthMode::BearerToken
    {
        return Err("server overrides missing".to_string());
    }
    Ok(())
}

#[test]
fn require_confirm_only_false_disables() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&dir, common::MINIMAL_TOML)?;
    for (value, expected) in [("false", false), ("FALSE", false), ("0", true), ("no", true)] {
        let lookup = common::env_from(&[("ADMIN_GATE_REQUIRE_CONFIRM", value)]);
        let config =
            AdminGateConfig::load_with_env(Some(&path), lookup).map_err(|err| err.to_string())?;
        if config.confirm.require_confirm != expected {
            return Err(format!("{value} should give require_confirm={expected}"));
        }
    }
    Ok(())
}

#[test]
fn invalid_ttl_override_rejected() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&dir, common::MINIMAL_TOML)?;
    let lookup = common::env_from(&[("ADMIN_GATE_CONFIRM_TTL_SECONDS", "five")]);
    match AdminGateConfig::load_with_env(Some(&path), lookup) {
        Err(err) if err.to_string().contains("must be an integer") => Ok(()),
        other => Err(format!("expected ttl parse error, got ok={}", other.is_ok())),
    }
}

#[test]
fn unknown_transport_override_rejected() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = write_config(&dir, common::MINIMAL_TOML)?;
    let lookup = common::env_from(&[("ADMIN_GATE_TRANSPORT", "websocket")]);
    if AdminGateConfig::load_with_env(Some(&path), lookup).is_ok() {
        return Err("expected transport override error".to_string());
    }
    Ok(())
}
