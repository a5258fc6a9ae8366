//! Core types used throughout the reconbridge library.
//!
//! This module defines the per-stage findings a scan is assembled from and
//! the lifecycle state of a scan.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status text recorded for a probed pair whose invocation faulted.
pub const PROBE_ERROR_STATUS: &str = "Error";

/// Final state of a published scan.
///
/// A scan that is still running has no record; readers learn about it from
/// the orchestrator's in-flight registry instead.
///
/// - `Completed`: all stages joined and the record was published
/// - `Failed`: the scan was cancelled or exceeded its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// The scan finished and its findings were published.
    Completed,
    /// The scan was aborted before its stages joined.
    Failed,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One of the three stages a scan is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    /// Subdomain enumeration.
    Subdomains,
    /// Port scan of the domain itself.
    Ports,
    /// HTTP probing of every discovered subdomain.
    Probe,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subdomains => write!(f, "subdomains"),
            Self::Ports => write!(f, "ports"),
            Self::Probe => write!(f, "probe"),
        }
    }
}

/// An open TCP port observed by the port scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenPort {
    /// Port number.
    pub port: u16,
    /// Always `"open"`; closed and filtered ports are never recorded.
    pub status: String,
}

impl OpenPort {
    /// Creates an open port entry.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            status: "open".to_string(),
        }
    }
}

/// The outcome of probing one `(subdomain, port)` pair over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Host that was probed.
    pub subdomain: String,
    /// Port that was probed.
    pub port: u16,
    /// Trimmed tool output, or [`PROBE_ERROR_STATUS`] if the invocation faulted.
    pub status: String,
}

impl ProbeResult {
    /// Creates a probe result.
    pub fn new(subdomain: impl Into<String>, port: u16, status: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            port,
            status: status.into(),
        }
    }

    /// Creates a probe result for a pair whose invocation faulted.
    pub fn errored(subdomain: impl Into<String>, port: u16) -> Self {
        Self::new(subdomain, port, PROBE_ERROR_STATUS)
    }

    /// Returns `true` if the invocation for this pair faulted.
    pub fn is_error(&self) -> bool {
        self.status == PROBE_ERROR_STATUS
    }

    /// Formats the pair as a transcript line (without the trailing newline).
    pub fn transcript_line(&self) -> String {
        format!("{}:{} - {}", self.subdomain, self.port, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_state_serde() {
        assert_eq!(
            serde_json::to_string(&ScanState::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(ScanState::Failed.to_string(), "failed");
        let state: Result<ScanState, _> = serde_json::from_str("\"scanning\"");
        assert!(state.is_err());
    }

    #[test]
    fn test_probe_result_transcript_line() {
        let ok = ProbeResult::new("a.example.com", 443, "200");
        assert_eq!(ok.transcript_line(), "a.example.com:443 - 200");
        assert!(!ok.is_error());

        let failed = ProbeResult::errored("b.example.com", 80);
        assert_eq!(failed.transcript_line(), "b.example.com:80 - Error");
        assert!(failed.is_error());
    }

    #[test]
    fn test_open_port_status() {
        assert_eq!(OpenPort::new(8080).status, "open");
    }
}
