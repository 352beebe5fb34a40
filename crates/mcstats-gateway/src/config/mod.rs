//! Relay config loader (strict parsing + environment overrides).
//!
//! Resolution order:
//! 1. built-in defaults
//! 2. optional YAML file named by `MCSTATS_CONFIG`
//! 3. environment: `STATSD_HOST`, `STATSD_PORT`, `RACK_ENV`, `MCSTATS_LISTEN`
//!
//! Empty environment values are treated as unset.

pub mod schema;

use std::fs;

use mcstats_core::error::{RelayError, Result};

pub use schema::{ExecMode, RelayConfig, StatsdSection};

pub const ENV_CONFIG_FILE: &str = "MCSTATS_CONFIG";
pub const ENV_STATSD_HOST: &str = "STATSD_HOST";
pub const ENV_STATSD_PORT: &str = "STATSD_PORT";
pub const ENV_MODE: &str = "RACK_ENV";
pub const ENV_LISTEN: &str = "MCSTATS_LISTEN";

pub fn load_from_file(path: &str) -> Result<RelayConfig> {
    load_from_str(&read_file(path)?)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from the process environment.
pub fn load_from_env() -> Result<RelayConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using an arbitrary variable lookup.
pub fn load_with<F>(lookup: F) -> Result<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let mut cfg = match var(ENV_CONFIG_FILE) {
        Some(path) => parse_str(&read_file(&path)?)?,
        None => RelayConfig::default(),
    };

    if let Some(host) = var(ENV_STATSD_HOST) {
        cfg.statsd.host = host;
    }
    if let Some(port) = var(ENV_STATSD_PORT) {
        cfg.statsd.port = port.trim().parse().map_err(|e| {
            RelayError::Config(format!("{ENV_STATSD_PORT} must be a port number ({port:?}): {e}"))
        })?;
    }
    if let Some(mode) = var(ENV_MODE) {
        cfg.env = ExecMode::from(mode);
    }
    if let Some(listen) = var(ENV_LISTEN) {
        cfg.listen = Some(listen);
    }

    cfg.validate()?;
    Ok(cfg)
}

fn read_file(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| RelayError::Config(format!("read config failed ({path}): {e}")))
}

fn parse_str(s: &str) -> Result<RelayConfig> {
    // An empty document deserializes as null; treat it as all defaults.
    if s.trim().is_empty() {
        return Ok(RelayConfig::default());
    }
    serde_yaml::from_str(s).map_err(|e| RelayError::Config(format!("invalid yaml: {e}")))
}
