//! # Reconbridge
//!
//! Domain reconnaissance orchestration over `subfinder`, `nmap` and `httpx`,
//! with results served progressively over HTTP.
//!
//! ## Overview
//!
//! A scan of a domain runs three external tools:
//!
//! - Subdomain enumeration and a port scan start concurrently
//! - HTTP probing of every discovered subdomain starts once enumeration
//!   finishes, and is skipped when nothing was found
//! - The three outcomes are joined into one [`ScanRecord`] and published
//!   to the [`ResultStore`] in a single step
//!
//! A tool that is missing, fails or runs too long degrades its part of the
//! record to empty instead of failing the scan.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reconbridge::backends::{MockHttpProber, MockPortScanner, MockSubdomainSource};
//! use reconbridge::{Domain, ScanOrchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Arc::new(
//!         ScanOrchestrator::builder()
//!             .with_subdomain_source(MockSubdomainSource::new(["a.example.com"]))
//!             .with_port_scanner(MockPortScanner::new([80, 443]))
//!             .with_http_prober(MockHttpProber::new())
//!             .build()?,
//!     );
//!
//!     let handle = orchestrator.start_scan(Domain::parse("example.com")?);
//!     if let Some(record) = handle.wait().await {
//!         println!("{} probe results", record.probe_results.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes the HTTP gateway
//! - `server` - The axum gateway and the `reconbridge` binary
//!
//! ## Architecture
//!
//! - **Core**: Domain, record types, adapter traits and errors
//! - **Backends**: Tool adapters and mocks
//! - **Artifact**: Per-domain probe transcripts
//! - **Manager**: Orchestration and the result store
//! - **Audit**: Structured scan lifecycle events
//! - **Gateway**: The HTTP API

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod artifact;
pub mod audit;
pub mod backends;
pub mod core;
#[cfg(feature = "server")]
pub mod gateway;
pub mod manager;

// Re-export commonly used types at the crate root
pub use crate::core::{
    AdapterError, ConfigError, Domain, DomainError, HttpProber, OpenPort, PortScanner,
    ProbeResult, ScanRecord, ScanState, SubdomainSource, ToolAdapter,
};

pub use crate::artifact::TranscriptStore;
pub use crate::manager::{
    OrchestratorConfig, ResultStore, ScanHandle, ScanOrchestrator, ScanStatus,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use reconbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::artifact::TranscriptStore;
    pub use crate::core::{
        AdapterError, ConfigError, Domain, DomainError, HttpProber, OpenPort, PortScanner,
        ProbeResult, ScanRecord, ScanState, SubdomainSource, ToolAdapter,
    };
    pub use crate::manager::{
        OrchestratorConfig, ResultStore, ScanHandle, ScanOrchestrator, ScanStatus,
    };
}
