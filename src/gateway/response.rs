//! Request and response bodies for the HTTP API.

use crate::core::{ArtifactError, ScanRecord};
use crate::manager::ScanStatus;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Message sent with a `pending` status.
pub const PENDING_MESSAGE: &str = "Scan in progress or not found";

/// Message sent when no transcript exists for a domain.
pub const TRANSCRIPT_MISSING_MESSAGE: &str = "Scan results file not found or still being generated.";

/// Body of `POST /api/scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    /// Domain to scan.
    pub domain: String,
}

/// A discovered subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainEntry {
    /// Hostname.
    pub subdomain: String,
}

/// An open port. The port is rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    /// Port number.
    pub port: String,
    /// Always `"open"`.
    pub status: String,
}

/// One probed `(subdomain, port)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeEntry {
    /// Probed hostname.
    pub subdomain: String,
    /// Status text, or `"Error"`.
    pub status: String,
    /// Probed port.
    pub port: String,
}

/// The JSON shape shared by every scan endpoint.
///
/// Acknowledgements and status replies carry only `status` and `message`;
/// a published record carries the three result lists as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    /// Scan id of the published record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,

    /// Discovered subdomains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<Vec<SubdomainEntry>>,

    /// Open ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_ports: Option<Vec<PortEntry>>,

    /// Probe results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub httpx_results: Option<Vec<ProbeEntry>>,

    /// `scanning`, `pending`, `completed`, `failed`, `cancelled` or `error`.
    pub status: String,

    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScanResponse {
    fn bare(status: &str, message: Option<String>) -> Self {
        Self {
            status: status.to_string(),
            message,
            ..Self::default()
        }
    }

    /// Acknowledges a started scan.
    pub fn started(domain: &str) -> Self {
        Self::bare("scanning", Some(format!("Scan started for {domain}")))
    }

    /// Reports a scan still in flight.
    pub fn scanning() -> Self {
        Self::bare("scanning", None)
    }

    /// Reports that nothing is known about a domain.
    pub fn pending() -> Self {
        Self::bare("pending", Some(PENDING_MESSAGE.to_string()))
    }

    /// Reports a cancellation request.
    pub fn cancelled(domain: &str, count: usize) -> Self {
        Self::bare(
            "cancelled",
            Some(format!("Cancelled {count} scan(s) for {domain}")),
        )
    }
}

impl From<&ScanRecord> for ScanResponse {
    fn from(record: &ScanRecord) -> Self {
        Self {
            scan_id: Some(record.id.clone()),
            subdomains: Some(
                record
                    .subdomains
                    .iter()
                    .map(|subdomain| SubdomainEntry {
                        subdomain: subdomain.clone(),
                    })
                    .collect(),
            ),
            open_ports: Some(
                record
                    .open_ports
                    .iter()
                    .map(|open| PortEntry {
                        port: open.port.to_string(),
                        status: open.status.clone(),
                    })
                    .collect(),
            ),
            httpx_results: Some(
                record
                    .probe_results
                    .iter()
                    .map(|probe| ProbeEntry {
                        subdomain: probe.subdomain.clone(),
                        status: probe.status.clone(),
                        port: probe.port.to_string(),
                    })
                    .collect(),
            ),
            status: record.state.to_string(),
            message: record.failure.clone(),
        }
    }
}

impl From<ScanStatus> for ScanResponse {
    fn from(status: ScanStatus) -> Self {
        match status {
            ScanStatus::Pending => Self::pending(),
            ScanStatus::Scanning => Self::scanning(),
            ScanStatus::Finished(record) => Self::from(record.as_ref()),
        }
    }
}

/// An error reply: `{"status":"error","message":...}` with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: StatusCode,
    /// Message sent to the client.
    pub message: String,
}

impl ApiError {
    /// Creates a new error reply.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A `404 Not Found`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// A `500 Internal Server Error`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ArtifactError> for ApiError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::InvalidName { .. } => Self::bad_request(err.to_string()),
            ArtifactError::NotFound { .. } => Self::not_found(TRANSCRIPT_MISSING_MESSAGE),
            ArtifactError::Io(e) => {
                tracing::error!(error = %e, "Transcript read failed");
                Self::internal("Failed to read scan results file")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ScanResponse::bare("error", Some(self.message));
        (self.status, Json(body)).into_response()
    }
}

/// Result type for gateway handlers.
pub type ApiResult<T> = Result<T, ApiError>;
