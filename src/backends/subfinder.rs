//! Subdomain enumeration backed by `subfinder`.
//!
//! Runs `subfinder -d <domain> -silent` and treats every non-blank output
//! line as one hostname.

use crate::backends::command::{ensure_installed, ToolCommand};
use crate::core::{AdapterError, Domain, SubdomainSource, ToolAdapter};

use async_trait::async_trait;
use std::path::PathBuf;

/// Configuration for the `subfinder` adapter.
#[derive(Debug, Clone)]
pub struct SubfinderConfig {
    /// Program to invoke. Resolved on `PATH` when relative.
    pub program: PathBuf,
}

impl Default for SubfinderConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("subfinder"),
        }
    }
}

impl SubfinderConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the program path.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

/// Subdomain source that shells out to `subfinder`.
#[derive(Debug, Clone, Default)]
pub struct Subfinder {
    config: SubfinderConfig,
}

impl Subfinder {
    /// Creates an adapter with the given configuration.
    pub fn new(config: SubfinderConfig) -> Self {
        Self { config }
    }

    fn command(&self, domain: &Domain) -> ToolCommand {
        ToolCommand::new(self.name(), self.config.program.clone())
            .arg("-d")
            .arg(domain.as_str())
            .arg("-silent")
    }
}

/// Splits subfinder output into hostnames, dropping blank lines.
pub fn parse_subdomains(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl ToolAdapter for Subfinder {
    fn name(&self) -> &str {
        "subfinder"
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        ensure_installed(self.name(), &self.config.program)
    }
}

#[async_trait]
impl SubdomainSource for Subfinder {
    async fn enumerate(&self, domain: &Domain) -> Result<Vec<String>, AdapterError> {
        let output = self.command(domain).run().await?;
        let subdomains = parse_subdomains(&output);

        tracing::info!(
            domain = %domain,
            count = subdomains.len(),
            "Subdomain enumeration finished"
        );

        Ok(subdomains)
    }
}
