//! Scan record structures.
//!
//! A [`ScanRecord`] is the aggregated outcome of one scan. It is assembled
//! once, after every stage has joined, and published as an immutable
//! snapshot so readers never see a half-filled record.

use crate::core::domain::Domain;
use crate::core::types::{OpenPort, ProbeResult, ScanState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Findings gathered by the three scan stages before they are published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageFindings {
    /// Subdomains in discovery order.
    pub subdomains: Vec<String>,
    /// Open ports in discovery order.
    pub open_ports: Vec<OpenPort>,
    /// One entry per probed `(subdomain, port)` pair.
    pub probe_results: Vec<ProbeResult>,
}

/// The aggregated outcome of one scan for a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Unique identifier of the scan that produced this record.
    pub id: String,

    /// The scanned domain; key of the record in the result store.
    pub domain: String,

    /// Discovered hostnames in discovery order. Not deduplicated.
    pub subdomains: Vec<String>,

    /// Observed open ports.
    pub open_ports: Vec<OpenPort>,

    /// Probe outcome per `(subdomain, port)` pair.
    pub probe_results: Vec<ProbeResult>,

    /// Final state of the scan.
    pub state: ScanState,

    /// Why the scan failed, when `state` is [`ScanState::Failed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    /// When the scan was started.
    pub started_at: DateTime<Utc>,

    /// When the record was assembled.
    pub completed_at: DateTime<Utc>,

    /// Wall-clock time between start and assembly.
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl ScanRecord {
    /// Assembles a completed record from joined stage findings.
    pub fn completed(
        id: impl Into<String>,
        domain: &Domain,
        findings: StageFindings,
        started_at: DateTime<Utc>,
    ) -> Self {
        let StageFindings {
            subdomains,
            open_ports,
            probe_results,
        } = findings;

        Self::assemble(id.into(), domain, started_at)
            .with_findings(subdomains, open_ports, probe_results)
    }

    /// Builds a failed record. All finding fields are empty.
    pub fn failed(
        id: impl Into<String>,
        domain: &Domain,
        reason: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::assemble(id.into(), domain, started_at);
        record.state = ScanState::Failed;
        record.failure = Some(reason.into());
        record
    }

    fn assemble(id: String, domain: &Domain, started_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id,
            domain: domain.as_str().to_string(),
            subdomains: Vec::new(),
            open_ports: Vec::new(),
            probe_results: Vec::new(),
            state: ScanState::Completed,
            failure: None,
            started_at,
            completed_at: now,
            duration: (now - started_at).to_std().unwrap_or_default(),
        }
    }

    fn with_findings(
        mut self,
        subdomains: Vec<String>,
        open_ports: Vec<OpenPort>,
        probe_results: Vec<ProbeResult>,
    ) -> Self {
        self.subdomains = subdomains;
        self.open_ports = open_ports;
        self.probe_results = probe_results;
        self
    }

    /// Returns `true` if all stages joined and the findings were published.
    pub fn is_completed(&self) -> bool {
        self.state == ScanState::Completed
    }

    /// Returns `true` if the scan was cancelled or timed out.
    pub fn is_failed(&self) -> bool {
        self.state == ScanState::Failed
    }

    /// Returns the number of probed pairs whose invocation faulted.
    pub fn probe_error_count(&self) -> usize {
        self.probe_results.iter().filter(|r| r.is_error()).count()
    }
}

/// Serde helper for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
