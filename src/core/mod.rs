//! Core types and traits for the reconbridge library.
//!
//! This module provides the fundamental building blocks used throughout
//! the library:
//!
//! - [`domain`] - The validated `Domain` scan target
//! - [`types`] - Per-stage findings like `OpenPort` and `ProbeResult`
//! - [`result`] - The aggregated `ScanRecord`
//! - [`traits`] - The tool adapter traits
//! - [`error`] - Structured error types

pub mod domain;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types at the core level
pub use domain::Domain;
pub use error::{AdapterError, ArtifactError, ConfigError, DomainError};
pub use result::{ScanRecord, StageFindings};
pub use traits::{
    ArcHttpProber, ArcPortScanner, ArcSubdomainSource, HttpProber, PortScanner, SubdomainSource,
    ToolAdapter,
};
pub use types::{OpenPort, ProbeResult, ScanStage, ScanState, PROBE_ERROR_STATUS};
