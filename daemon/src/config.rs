//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use vigil_types::AttestParams;

/// Configuration for the VIGIL service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). CLI flags and environment
/// variables override file values in `main`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Port the HTTP API listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Admin credential. Empty disables the admin surface entirely.
    #[serde(default)]
    pub admin_token: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Period of the expired-entry sweeper, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Attestation protocol parameters (TTLs, sensor thresholds).
    #[serde(default)]
    pub params: AttestParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_port() -> u16 {
    7210
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_sweep_interval() -> u64 {
    30
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    /// The admin credential, with empty treated as disabled.
    pub fn admin_token(&self) -> Option<String> {
        if self.admin_token.is_empty() {
            None
        } else {
            Some(self.admin_token.clone())
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            admin_token: String::new(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            sweep_interval_secs: default_sweep_interval(),
            params: AttestParams::default(),
        }
    }
}
