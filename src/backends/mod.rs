//! External tool adapter implementations.
//!
//! This module contains implementations of the adapter traits for the
//! external discovery tools the scan depends on.
//!
//! ## Available Backends
//!
//! - [`subfinder`] - Subdomain enumeration
//! - [`nmap`] - Port scanning
//! - [`httpx`] - HTTP probing
//! - [`mock`] - Mock adapters for testing
//!
//! ## Implementing a Custom Backend
//!
//! To swap in another tool, implement [`ToolAdapter`](crate::core::ToolAdapter)
//! plus the stage trait it serves:
//!
//! ```rust,ignore
//! use reconbridge::core::{AdapterError, Domain, SubdomainSource, ToolAdapter};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! pub struct Amass;
//!
//! #[async_trait]
//! impl ToolAdapter for Amass {
//!     fn name(&self) -> &str {
//!         "amass"
//!     }
//!
//!     async fn health_check(&self) -> Result<(), AdapterError> {
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl SubdomainSource for Amass {
//!     async fn enumerate(&self, domain: &Domain) -> Result<Vec<String>, AdapterError> {
//!         todo!()
//!     }
//! }
//! ```

pub mod command;
pub mod httpx;
pub mod mock;
pub mod nmap;
pub mod subfinder;

// Re-exports
pub use command::ToolCommand;
pub use httpx::{Httpx, HttpxConfig};
pub use mock::{MockHttpProber, MockPortScanner, MockSubdomainSource};
pub use nmap::{Nmap, NmapConfig};
pub use subfinder::{Subfinder, SubfinderConfig};
