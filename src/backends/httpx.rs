//! HTTP probing backed by `httpx`.
//!
//! Each `(host, port)` pair is a separate run of
//! `httpx -u http://<host>:<port> -silent -status-code`. The trimmed output
//! is taken verbatim as the pair's status.

use crate::backends::command::{ensure_installed, ToolCommand};
use crate::core::{AdapterError, HttpProber, ToolAdapter};

use async_trait::async_trait;
use std::path::PathBuf;

/// Configuration for the `httpx` adapter.
#[derive(Debug, Clone)]
pub struct HttpxConfig {
    /// Program to invoke.
    pub program: PathBuf,
}

impl Default for HttpxConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("httpx"),
        }
    }
}

impl HttpxConfig {
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

/// HTTP prober that shells out to `httpx`.
#[derive(Debug, Clone, Default)]
pub struct Httpx {
    config: HttpxConfig,
}

impl Httpx {
    /// Creates an adapter with the given configuration.
    pub fn new(config: HttpxConfig) -> Self {
        Self { config }
    }

    fn command(&self, host: &str, port: u16) -> ToolCommand {
        ToolCommand::new(self.name(), self.config.program.clone())
            .arg("-u")
            .arg(target_url(host, port))
            .args(["-silent", "-status-code"])
    }
}

/// Builds the URL probed for a pair.
pub fn target_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}")
}

#[async_trait]
impl ToolAdapter for Httpx {
    fn name(&self) -> &str {
        "httpx"
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        ensure_installed(self.name(), &self.config.program)
    }
}

#[async_trait]
impl HttpProber for Httpx {
    async fn probe(&self, host: &str, port: u16) -> Result<String, AdapterError> {
        let output = self.command(host, port).run().await?;
        Ok(output.trim().to_string())
    }
}
