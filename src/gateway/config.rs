//! Gateway configuration loaded from the environment.

use crate::core::ConfigError;
use crate::manager::OrchestratorConfig;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Origins allowed by CORS when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

/// Address the gateway binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Directory probe transcripts are written to and served from.
    pub artifact_dir: PathBuf,

    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,

    /// Orchestrator settings.
    pub orchestrator: OrchestratorConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            artifact_dir: PathBuf::from("."),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from a `.env` file (if present) and the process
    /// environment.
    ///
    /// Recognised variables: `RECON_BIND_ADDR`, `RECON_ARTIFACT_DIR`,
    /// `RECON_ALLOWED_ORIGINS` (comma separated), `RECON_ADAPTER_TIMEOUT_SECS`
    /// and `RECON_SCAN_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::new(format!("failed to load .env: {e}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("RECON_BIND_ADDR") {
            config.bind_addr = addr
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("RECON_BIND_ADDR {addr:?}: {e}")))?;
        }

        if let Some(dir) = lookup("RECON_ARTIFACT_DIR") {
            if !dir.trim().is_empty() {
                config.artifact_dir = PathBuf::from(dir.trim());
            }
        }

        if let Some(origins) = lookup("RECON_ALLOWED_ORIGINS") {
            let origins = parse_origins(&origins);
            if origins.is_empty() {
                return Err(ConfigError::new("RECON_ALLOWED_ORIGINS lists no origins"));
            }
            config.allowed_origins = origins;
        }

        if let Some(secs) = lookup("RECON_ADAPTER_TIMEOUT_SECS") {
            config.orchestrator.adapter_timeout = parse_secs("RECON_ADAPTER_TIMEOUT_SECS", &secs)?;
        }

        if let Some(secs) = lookup("RECON_SCAN_TIMEOUT_SECS") {
            config.orchestrator.scan_timeout = parse_secs("RECON_SCAN_TIMEOUT_SECS", &secs)?;
        }

        config.orchestrator.validate()?;
        Ok(config)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::new(format!("{key} {raw:?}: {e}")))
}
