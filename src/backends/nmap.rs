//! Port scanning backed by `nmap`.
//!
//! Runs `nmap -p<ports> -T4 <domain>` and picks the open TCP ports out of
//! the human-readable report, where they appear as
//! `443/tcp open  https`.

use crate::backends::command::{ensure_installed, ToolCommand};
use crate::core::{AdapterError, Domain, OpenPort, PortScanner, ToolAdapter};

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;

/// Ports scanned when none are configured.
pub const DEFAULT_SCAN_PORTS: [u16; 4] = [80, 443, 8080, 8443];

/// Configuration for the `nmap` adapter.
#[derive(Debug, Clone)]
pub struct NmapConfig {
    /// Program to invoke.
    pub program: PathBuf,
    /// Ports passed to `-p`.
    pub ports: Vec<u16>,
    /// Timing template passed as `-T<n>`.
    pub timing: u8,
}

impl Default for NmapConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("nmap"),
            ports: DEFAULT_SCAN_PORTS.to_vec(),
            timing: 4,
        }
    }
}

impl NmapConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the program path.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the ports to scan.
    pub fn with_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports = ports.into_iter().collect();
        self
    }

    /// Sets the timing template (0-5).
    pub fn with_timing(mut self, timing: u8) -> Self {
        self.timing = timing.min(5);
        self
    }

    fn port_arg(&self) -> String {
        let list = self
            .ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("-p{list}")
    }
}

/// Port scanner that shells out to `nmap`.
#[derive(Debug, Clone, Default)]
pub struct Nmap {
    config: NmapConfig,
}

impl Nmap {
    /// Creates an adapter with the given configuration.
    pub fn new(config: NmapConfig) -> Self {
        Self { config }
    }

    fn command(&self, domain: &Domain) -> ToolCommand {
        ToolCommand::new(self.name(), self.config.program.clone())
            .arg(self.config.port_arg())
            .arg(format!("-T{}", self.config.timing))
            .arg(domain.as_str())
    }
}

/// Extracts open TCP ports from an nmap text report.
///
/// A line counts when it mentions both `/tcp` and `open`; the port is the
/// part of the first field before the `/`. Lines whose first field is not a
/// port number are skipped, and a port is reported once.
pub fn parse_open_ports(output: &str) -> Vec<OpenPort> {
    let mut seen = HashSet::new();

    output
        .lines()
        .filter(|line| line.contains("/tcp") && line.contains("open"))
        .filter_map(|line| line.split_whitespace().next())
        .filter_map(|field| field.split('/').next())
        .filter_map(|port| port.parse::<u16>().ok())
        .filter(|port| seen.insert(*port))
        .map(OpenPort::new)
        .collect()
}

#[async_trait]
impl ToolAdapter for Nmap {
    fn name(&self) -> &str {
        "nmap"
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        ensure_installed(self.name(), &self.config.program)
    }
}

#[async_trait]
impl PortScanner for Nmap {
    async fn scan_ports(&self, domain: &Domain) -> Result<Vec<OpenPort>, AdapterError> {
        let output = self.command(domain).run().await?;
        let open_ports = parse_open_ports(&output);

        tracing::info!(
            domain = %domain,
            count = open_ports.len(),
            "Port scan finished"
        );

        Ok(open_ports)
    }
}
