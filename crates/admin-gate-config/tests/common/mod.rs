// crates/admin-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for admin-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::HashMap;

use admin_gate_config::AdminGateConfig;
use admin_gate_config::ConfigError;

/// Minimal TOML that validates with default settings.
pub const MINIMAL_TOML: &str = r#"
[downstream]
base_url = "https://shop.example.com/"

[confirm]
secret = "signing-secret"
"#;

/// Parses a TOML string into an `AdminGateConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<AdminGateConfig, ConfigError> {
    AdminGateConfig::from_toml_str(toml_str)
}

/// Returns a minimal config that passes validation.
pub fn minimal_config() -> Result<AdminGateConfig, ConfigError> {
    config_from_toml(MINIMAL_TOML)
}

/// Builds an environment lookup over a fixed map.
pub fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect();
    move |key| map.get(key).cloned()
}

/// Environment lookup with nothing set.
pub fn empty_env(_key: &str) -> Option<String> {
    None
}
