//! Core traits for the reconbridge library.
//!
//! Each external discovery tool sits behind one of the adapter traits
//! below. The orchestrator only ever talks to these traits, which is what
//! lets the tests swap the real tools for the mocks in
//! [`crate::backends::mock`].

use crate::core::domain::Domain;
use crate::core::error::AdapterError;
use crate::core::types::OpenPort;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Behaviour shared by every external tool adapter.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync` for use in async contexts.
/// - Implementations should never panic; every fault is an [`AdapterError`].
/// - `health_check` should be cheap: it answers "is the tool installed",
///   not "does the target respond".
#[async_trait]
pub trait ToolAdapter: Send + Sync + Debug {
    /// Returns a stable name for the adapter, like `"subfinder"`.
    fn name(&self) -> &str;

    /// Verifies that the backing tool can be invoked.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::ToolUnavailable`] if the tool is missing.
    async fn health_check(&self) -> Result<(), AdapterError>;
}

/// Enumerates the subdomains of a domain.
#[async_trait]
pub trait SubdomainSource: ToolAdapter {
    /// Returns discovered hostnames in discovery order.
    ///
    /// # Errors
    ///
    /// Any invocation fault. The caller degrades it to an empty list.
    async fn enumerate(&self, domain: &Domain) -> Result<Vec<String>, AdapterError>;
}

/// Scans a domain for open TCP ports.
#[async_trait]
pub trait PortScanner: ToolAdapter {
    /// Returns the open ports that were observed.
    ///
    /// # Errors
    ///
    /// Any invocation fault. The caller degrades it to an empty list.
    async fn scan_ports(&self, domain: &Domain) -> Result<Vec<OpenPort>, AdapterError>;
}

/// Probes a single `(host, port)` pair over HTTP.
#[async_trait]
pub trait HttpProber: ToolAdapter {
    /// Returns the trimmed status text for the pair, such as `"200"`.
    ///
    /// # Errors
    ///
    /// Any invocation fault. The caller records it as the `"Error"` token.
    async fn probe(&self, host: &str, port: u16) -> Result<String, AdapterError>;
}

/// An arc-wrapped subdomain source for shared ownership.
pub type ArcSubdomainSource = Arc<dyn SubdomainSource>;

/// An arc-wrapped port scanner for shared ownership.
pub type ArcPortScanner = Arc<dyn PortScanner>;

/// An arc-wrapped HTTP prober for shared ownership.
pub type ArcHttpProber = Arc<dyn HttpProber>;
