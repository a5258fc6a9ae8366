//! Audit event types and emission functions.

use crate::core::{AdapterError, Domain, ScanRecord, ScanStage};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a published scan for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAuditEvent {
    /// Event type.
    pub event_type: String,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Unique scan ID.
    pub scan_id: String,

    /// Scanned domain.
    pub domain: String,

    /// Final state (`completed` or `failed`).
    pub state: String,

    /// Number of discovered subdomains.
    pub subdomain_count: usize,

    /// Number of open ports.
    pub open_port_count: usize,

    /// Number of probed pairs.
    pub probe_count: usize,

    /// Number of probed pairs whose invocation faulted.
    pub probe_error_count: usize,

    /// Scan duration in milliseconds.
    pub duration_ms: u64,

    /// Failure reason, if the scan failed.
    pub failure: Option<String>,
}

impl From<&ScanRecord> for ScanAuditEvent {
    fn from(record: &ScanRecord) -> Self {
        Self {
            event_type: "scan_published".to_string(),
            timestamp: record.completed_at,
            scan_id: record.id.clone(),
            domain: record.domain.clone(),
            state: record.state.to_string(),
            subdomain_count: record.subdomains.len(),
            open_port_count: record.open_ports.len(),
            probe_count: record.probe_results.len(),
            probe_error_count: record.probe_error_count(),
            duration_ms: record.duration.as_millis() as u64,
            failure: record.failure.clone(),
        }
    }
}

/// Emits an audit event for a scan starting.
pub fn emit_scan_started(scan_id: &str, domain: &Domain) {
    tracing::info!(
        target: "reconbridge::audit",
        event_type = "scan_started",
        scan_id = %scan_id,
        domain = %domain,
        "Scan started"
    );
}

/// Emits an audit event for a stage that degraded to an empty result.
pub fn emit_stage_degraded(scan_id: &str, domain: &Domain, stage: ScanStage, error: &AdapterError) {
    tracing::warn!(
        target: "reconbridge::audit",
        event_type = "stage_degraded",
        scan_id = %scan_id,
        domain = %domain,
        stage = %stage,
        tool = %error.tool(),
        tool_missing = error.is_tool_missing(),
        error = %error,
        "Stage degraded to empty result"
    );
}

/// Emits an audit event for a published record.
pub fn emit_scan_published(record: &ScanRecord) {
    let event = ScanAuditEvent::from(record);

    tracing::info!(
        target: "reconbridge::audit",
        event_type = %event.event_type,
        scan_id = %event.scan_id,
        domain = %event.domain,
        state = %event.state,
        subdomain_count = event.subdomain_count,
        open_port_count = event.open_port_count,
        probe_count = event.probe_count,
        probe_error_count = event.probe_error_count,
        duration_ms = event.duration_ms,
        failure = ?event.failure,
        "Scan published"
    );
}

/// Emits an audit event for a cancellation request.
pub fn emit_scan_cancelled(domain: &str, cancelled: usize) {
    tracing::info!(
        target: "reconbridge::audit",
        event_type = "scan_cancelled",
        domain = %domain,
        cancelled,
        "Scan cancellation requested"
    );
}
