//! HTTP gateway.
//!
//! Accepts scan requests, validates the domain, starts the scan in the
//! background and serves published records and probe transcripts.

mod config;
mod response;
mod routes;

pub use config::{GatewayConfig, DEFAULT_ALLOWED_ORIGINS, DEFAULT_BIND_ADDR};
pub use response::{
    ApiError, ApiResult, PortEntry, ProbeEntry, ScanRequest, ScanResponse, SubdomainEntry,
    PENDING_MESSAGE, TRANSCRIPT_MISSING_MESSAGE,
};
pub use routes::{router, AppState};
