use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::Deserialize;
use mcstats_core::error::{RelayError, Result};

/// Port the relay listens on unless configured otherwise.
pub const DEFAULT_HTTP_PORT: u16 = 4567;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default)]
    pub env: ExecMode,

    /// HTTP listen address. Defaults depend on `env`, see [`RelayConfig::listen_addr`].
    #[serde(default)]
    pub listen: Option<String>,

    #[serde(default)]
    pub statsd: StatsdSection,
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        self.statsd.validate()?;
        self.listen_addr()?;
        Ok(())
    }

    /// Loopback in development, all interfaces otherwise.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        match &self.listen {
            Some(s) => s
                .parse()
                .map_err(|e| RelayError::Config(format!("listen must be a valid SocketAddr ({s:?}): {e}"))),
            None => {
                let ip = match self.env {
                    ExecMode::Development => IpAddr::V4(Ipv4Addr::LOCALHOST),
                    _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                };
                Ok(SocketAddr::new(ip, DEFAULT_HTTP_PORT))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsdSection {
    #[serde(default = "default_statsd_host")]
    pub host: String,

    #[serde(default = "default_statsd_port")]
    pub port: u16,
}

impl Default for StatsdSection {
    fn default() -> Self {
        Self {
            host: default_statsd_host(),
            port: default_statsd_port(),
        }
    }
}

impl StatsdSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RelayError::Config("statsd.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(RelayError::Config("statsd.port must not be 0".into()));
        }
        Ok(())
    }
}

fn default_statsd_host() -> String {
    "127.0.0.1".into()
}
fn default_statsd_port() -> u16 {
    8125
}

/// Execution mode. Only `test` changes behavior: emitter handles are built per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ExecMode {
    #[default]
    Development,
    Test,
    Production,
    Other(String),
}

impl ExecMode {
    pub fn is_test(&self) -> bool {
        matches!(self, ExecMode::Test)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecMode::Development => "development",
            ExecMode::Test => "test",
            ExecMode::Production => "production",
            ExecMode::Other(s) => s,
        }
    }
}

impl From<String> for ExecMode {
    fn from(s: String) -> Self {
        match s.trim() {
            "development" => ExecMode::Development,
            "test" => ExecMode::Test,
            "production" => ExecMode::Production,
            other => ExecMode::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
