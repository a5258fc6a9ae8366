//! Configuration for the scan orchestrator.

use crate::core::ConfigError;

use std::time::Duration;

/// Ports probed on every discovered subdomain when none are configured.
pub const DEFAULT_PROBE_PORTS: [u16; 2] = [80, 443];

/// Configuration for the scan orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for a single adapter invocation. An invocation that runs
    /// longer is killed and degrades to an empty result.
    pub adapter_timeout: Duration,

    /// Upper bound for a whole scan. A scan that runs longer is published as
    /// failed.
    pub scan_timeout: Duration,

    /// Ports probed on each discovered subdomain.
    pub probe_ports: Vec<u16>,

    /// Maximum number of probe invocations in flight for one scan.
    pub probe_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(300), // 5 minutes
            scan_timeout: Duration::from_secs(1800),   // 30 minutes
            probe_ports: DEFAULT_PROBE_PORTS.to_vec(),
            probe_concurrency: 4,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-invocation timeout.
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Sets the whole-scan deadline.
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Sets the ports probed on each subdomain.
    pub fn with_probe_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.probe_ports = ports.into_iter().collect();
        self
    }

    /// Sets how many probe invocations may run at once.
    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency;
        self
    }

    /// Checks the configuration for values the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adapter_timeout.is_zero() {
            return Err(ConfigError::new("adapter_timeout must be non-zero"));
        }
        if self.scan_timeout.is_zero() {
            return Err(ConfigError::new("scan_timeout must be non-zero"));
        }
        if self.probe_ports.is_empty() {
            return Err(ConfigError::new("at least one probe port is required"));
        }
        if self.probe_concurrency == 0 {
            return Err(ConfigError::new("probe_concurrency must be at least 1"));
        }
        Ok(())
    }
}
