//! Mock adapters for testing.
//!
//! This module provides configurable stand-ins for the three tool adapters
//! so scans can be exercised without subfinder, nmap or httpx installed.
//! Every mock counts its invocations, which is how tests check that a stage
//! was (or was not) run.
//!
//! # Examples
//!
//! ```rust
//! use reconbridge::backends::mock::{MockHttpProber, MockPortScanner, MockSubdomainSource};
//! use std::time::Duration;
//!
//! let subdomains = MockSubdomainSource::new(["a.example.com", "b.example.com"]);
//! let ports = MockPortScanner::new([80, 443]).with_latency(Duration::from_millis(20));
//! let prober = MockHttpProber::new()
//!     .with_response("a.example.com", 443, "200")
//!     .with_failure("b.example.com", 80);
//!
//! // A port scanner whose tool is not installed
//! let missing = MockPortScanner::unavailable();
//! ```

use crate::core::{
    AdapterError, Domain, HttpProber, OpenPort, PortScanner, SubdomainSource, ToolAdapter,
};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// How a mock reacts when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Healthy,
    Unavailable,
    Failing,
}

/// Behaviour shared by all mocks.
#[derive(Debug)]
struct MockControl {
    name: String,
    mode: Mode,
    latency: Option<Duration>,
    calls: AtomicU64,
}

impl MockControl {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Healthy,
            latency: None,
            calls: AtomicU64::new(0),
        }
    }

    fn health(&self) -> Result<(), AdapterError> {
        match self.mode {
            Mode::Unavailable => Err(AdapterError::tool_unavailable(&self.name)),
            _ => Ok(()),
        }
    }

    /// Counts the call, applies latency and returns the configured fault.
    async fn invoke(&self) -> Result<(), AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.mode == Mode::Unavailable {
            return Err(AdapterError::tool_unavailable(&self.name));
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.mode {
            Mode::Failing => Err(AdapterError::exit_failure(
                &self.name,
                Some(1),
                "simulated failure",
            )),
            _ => Ok(()),
        }
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A mock subdomain source returning a fixed list.
#[derive(Debug)]
pub struct MockSubdomainSource {
    control: MockControl,
    subdomains: Vec<String>,
}

impl MockSubdomainSource {
    /// Creates a source that discovers the given hostnames.
    pub fn new<I, S>(subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            control: MockControl::new("mock-subdomains"),
            subdomains: subdomains.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a source that discovers nothing.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Creates a source whose tool is not installed.
    pub fn unavailable() -> Self {
        Self::empty().with_mode(Mode::Unavailable)
    }

    /// Creates a source whose tool always exits with an error.
    pub fn failing() -> Self {
        Self::empty().with_mode(Mode::Failing)
    }

    fn with_mode(mut self, mode: Mode) -> Self {
        self.control.mode = mode;
        self
    }

    /// Sets the name of this mock.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.control.name = name.into();
        self
    }

    /// Sets the simulated latency per invocation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.control.latency = Some(latency);
        self
    }

    /// Returns the number of invocations.
    pub fn call_count(&self) -> u64 {
        self.control.calls()
    }
}

#[async_trait]
impl ToolAdapter for MockSubdomainSource {
    fn name(&self) -> &str {
        &self.control.name
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        self.control.health()
    }
}

#[async_trait]
impl SubdomainSource for MockSubdomainSource {
    async fn enumerate(&self, _domain: &Domain) -> Result<Vec<String>, AdapterError> {
        self.control.invoke().await?;
        Ok(self.subdomains.clone())
    }
}

/// A mock port scanner returning a fixed set of open ports.
#[derive(Debug)]
pub struct MockPortScanner {
    control: MockControl,
    ports: Vec<u16>,
}

impl MockPortScanner {
    /// Creates a scanner that reports the given ports as open.
    pub fn new(ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            control: MockControl::new("mock-ports"),
            ports: ports.into_iter().collect(),
        }
    }

    /// Creates a scanner that finds no open ports.
    pub fn empty() -> Self {
        Self::new([])
    }

    /// Creates a scanner whose tool is not installed.
    pub fn unavailable() -> Self {
        Self::empty().with_mode(Mode::Unavailable)
    }

    /// Creates a scanner whose tool always exits with an error.
    pub fn failing() -> Self {
        Self::empty().with_mode(Mode::Failing)
    }

    fn with_mode(mut self, mode: Mode) -> Self {
        self.control.mode = mode;
        self
    }

    /// Sets the name of this mock.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.control.name = name.into();
        self
    }

    /// Sets the simulated latency per invocation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.control.latency = Some(latency);
        self
    }

    /// Returns the number of invocations.
    pub fn call_count(&self) -> u64 {
        self.control.calls()
    }
}

#[async_trait]
impl ToolAdapter for MockPortScanner {
    fn name(&self) -> &str {
        &self.control.name
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        self.control.health()
    }
}

#[async_trait]
impl PortScanner for MockPortScanner {
    async fn scan_ports(&self, _domain: &Domain) -> Result<Vec<OpenPort>, AdapterError> {
        self.control.invoke().await?;
        Ok(self.ports.iter().copied().map(OpenPort::new).collect())
    }
}

/// A mock HTTP prober.
///
/// Unknown pairs answer with the default status (`"200"`). Individual
/// pairs can be given their own status or made to fail.
#[derive(Debug)]
pub struct MockHttpProber {
    control: MockControl,
    default_status: String,
    responses: RwLock<HashMap<(String, u16), String>>,
    failures: RwLock<HashSet<(String, u16)>>,
    delays: RwLock<HashMap<(String, u16), Duration>>,
}

impl MockHttpProber {
    /// Creates a prober that answers every pair with `"200"`.
    pub fn new() -> Self {
        Self {
            control: MockControl::new("mock-prober"),
            default_status: "200".to_string(),
            responses: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashSet::new()),
            delays: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a prober whose tool is not installed.
    pub fn unavailable() -> Self {
        let mut prober = Self::new();
        prober.control.mode = Mode::Unavailable;
        prober
    }

    /// Creates a prober whose every invocation fails.
    pub fn failing() -> Self {
        let mut prober = Self::new();
        prober.control.mode = Mode::Failing;
        prober
    }

    /// Sets the status returned for pairs without a specific response.
    pub fn with_default_status(mut self, status: impl Into<String>) -> Self {
        self.default_status = status.into();
        self
    }

    /// Sets the status returned for one pair.
    pub fn with_response(self, host: impl Into<String>, port: u16, status: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((host.into(), port), status.into());
        self
    }

    /// Makes the invocation for one pair fail.
    pub fn with_failure(self, host: impl Into<String>, port: u16) -> Self {
        self.failures
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((host.into(), port));
        self
    }

    /// Sets the simulated latency per invocation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.control.latency = Some(latency);
        self
    }

    /// Adds extra latency to one pair, on top of the per-invocation latency.
    pub fn with_pair_latency(self, host: impl Into<String>, port: u16, latency: Duration) -> Self {
        self.delays
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((host.into(), port), latency);
        self
    }

    /// Returns the number of probed pairs.
    pub fn probe_count(&self) -> u64 {
        self.control.calls()
    }
}

impl Default for MockHttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolAdapter for MockHttpProber {
    fn name(&self) -> &str {
        &self.control.name
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        self.control.health()
    }
}

#[async_trait]
impl HttpProber for MockHttpProber {
    async fn probe(&self, host: &str, port: u16) -> Result<String, AdapterError> {
        self.control.invoke().await?;

        let key = (host.to_string(), port);
        let delay = self
            .delays
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failures
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&key)
        {
            return Err(AdapterError::exit_failure(
                &self.control.name,
                Some(1),
                format!("simulated failure for {host}:{port}"),
            ));
        }

        let status = self
            .responses
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.default_status.clone());

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    #[tokio::test]
    async fn test_mock_subdomains() {
        let source = MockSubdomainSource::new(["a.example.com", "b.example.com"]);
        let found = source.enumerate(&domain()).await.unwrap();
        assert_eq!(found, vec!["a.example.com", "b.example.com"]);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_ports_unavailable() {
        let scanner = MockPortScanner::unavailable();
        assert!(scanner.health_check().await.is_err());

        let err = scanner.scan_ports(&domain()).await.unwrap_err();
        assert!(err.is_tool_missing());
        assert_eq!(scanner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failing_is_healthy_but_errors() {
        let source = MockSubdomainSource::failing();
        assert!(source.health_check().await.is_ok());
        assert!(matches!(
            source.enumerate(&domain()).await,
            Err(AdapterError::ExitFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_mock_prober_responses() {
        let prober = MockHttpProber::new()
            .with_response("a.example.com", 443, "301")
            .with_failure("a.example.com", 80);

        assert_eq!(prober.probe("a.example.com", 443).await.unwrap(), "301");
        assert_eq!(prober.probe("b.example.com", 443).await.unwrap(), "200");
        assert!(prober.probe("a.example.com", 80).await.is_err());
        assert_eq!(prober.probe_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_prober_pair_latency() {
        let prober = MockHttpProber::new().with_pair_latency(
            "a.example.com",
            80,
            Duration::from_secs(10),
        );

        let started = tokio::time::Instant::now();
        prober.probe("b.example.com", 80).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));

        prober.probe("a.example.com", 80).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_latency() {
        let scanner = MockPortScanner::new([80]).with_latency(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        let ports = scanner.scan_ports(&domain()).await.unwrap();
        assert_eq!(ports, vec![OpenPort::new(80)]);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
