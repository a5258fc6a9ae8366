//! Scan orchestration.
//!
//! The `ScanOrchestrator` runs the subdomain, port and probe stages for a
//! domain in the background, joins them into one `ScanRecord` and publishes
//! it to the `ResultStore`.

mod config;
mod handle;
mod orchestrator;
mod probe;
mod store;

pub use config::{OrchestratorConfig, DEFAULT_PROBE_PORTS};
pub use handle::ScanHandle;
pub use orchestrator::{HealthReport, ScanOrchestrator, ScanOrchestratorBuilder, ScanStatus};
pub use store::ResultStore;
