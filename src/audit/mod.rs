//! Structured audit logging.
//!
//! This module provides functions for emitting structured audit events
//! using the `tracing` crate under the `reconbridge::audit` target, so a
//! subscriber can route them separately from ordinary diagnostics.

mod events;

pub use events::{
    emit_scan_cancelled, emit_scan_published, emit_scan_started, emit_stage_degraded,
    ScanAuditEvent,
};
