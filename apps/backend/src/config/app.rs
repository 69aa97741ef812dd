//! Centralized application configuration loaded from environment variables.

use crate::config::backends::{BackendsConfig, MailConfig, MaintenanceConfig};
use crate::config::{opt_var, parse_var};
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// Everything the binary needs, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,

    // Security configuration
    pub security: SecurityConfig,

    // External backends (policy applied by the registry)
    pub backends: BackendsConfig,

    pub mail: MailConfig,
    pub maintenance: MaintenanceConfig,
}

impl Config {
    /// Load all configuration. Only settings without a backend failure policy
    /// (server address, signing secret, maintenance cadence) fail here.
    pub fn from_env() -> Result<Self, AppError> {
        let host = opt_var("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var::<u16>("BACKEND_PORT", 8080)?;

        Ok(Config {
            host,
            port,
            allowed_origins: parse_origins(&opt_var("ALLOWED_ORIGINS").unwrap_or_default()),
            security: SecurityConfig::from_env()?,
            backends: BackendsConfig::from_env(),
            mail: MailConfig::from_env(),
            maintenance: MaintenanceConfig::from_env()?,
        })
    }
}

/// Split a comma-separated origin list, keeping only http(s) origins.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}
