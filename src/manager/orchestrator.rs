//! The scan orchestrator.

use crate::artifact::TranscriptStore;
use crate::audit;
use crate::backends::{Httpx, Nmap, Subfinder};
use crate::core::{
    AdapterError, ArcHttpProber, ArcPortScanner, ArcSubdomainSource, ConfigError, Domain,
    HttpProber, OpenPort, PortScanner, ScanRecord, ScanStage, StageFindings, SubdomainSource,
};
use crate::manager::config::OrchestratorConfig;
use crate::manager::handle::{ActiveScans, ScanHandle};
use crate::manager::probe::ProbeStage;
use crate::manager::store::ResultStore;

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Where a domain stands from a reader's point of view.
#[derive(Debug, Clone)]
pub enum ScanStatus {
    /// No record has been published and no scan is running.
    Pending,
    /// A scan is running and nothing has been published yet.
    Scanning,
    /// The latest published record. A newer scan may already be running.
    Finished(Arc<ScanRecord>),
}

impl ScanStatus {
    /// Returns the published record, if any.
    pub fn record(&self) -> Option<&Arc<ScanRecord>> {
        match self {
            Self::Finished(record) => Some(record),
            _ => None,
        }
    }
}

/// Availability of each adapter's backing tool.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Adapter name to availability.
    pub tools: BTreeMap<String, bool>,
}

impl HealthReport {
    /// Returns `true` if every tool is available.
    pub fn all_available(&self) -> bool {
        self.tools.values().all(|available| *available)
    }

    /// Returns the names of tools that are missing.
    pub fn missing(&self) -> Vec<&str> {
        self.tools
            .iter()
            .filter(|(_, available)| !**available)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Why a scan ended without joining its stages.
#[derive(Debug, Clone, Copy)]
enum Abort {
    Cancelled,
    DeadlineExceeded(Duration),
}

impl Abort {
    fn reason(&self) -> String {
        match self {
            Self::Cancelled => "scan cancelled".to_string(),
            Self::DeadlineExceeded(limit) => format!("scan exceeded its {limit:?} deadline"),
        }
    }
}

/// Runs `fut` with a time budget, mapping an elapsed budget to
/// [`AdapterError::Timeout`]. The future is dropped on timeout, which kills
/// any child process it owns.
pub(crate) async fn bounded<T, F>(tool: &str, budget: Duration, fut: F) -> Result<T, AdapterError>
where
    F: Future<Output = Result<T, AdapterError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::timeout(tool, budget)),
    }
}

/// Builder for creating a `ScanOrchestrator`.
///
/// Adapters that are not set default to the real tools (`subfinder`,
/// `nmap`, `httpx`) and transcripts default to the working directory.
pub struct ScanOrchestratorBuilder {
    subdomains: Option<ArcSubdomainSource>,
    ports: Option<ArcPortScanner>,
    prober: Option<ArcHttpProber>,
    transcripts: Option<TranscriptStore>,
    config: OrchestratorConfig,
}

impl ScanOrchestratorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            subdomains: None,
            ports: None,
            prober: None,
            transcripts: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// Sets the subdomain source.
    pub fn with_subdomain_source<S: SubdomainSource + 'static>(mut self, source: S) -> Self {
        self.subdomains = Some(Arc::new(source));
        self
    }

    /// Sets the subdomain source wrapped in an Arc.
    pub fn with_arc_subdomain_source(mut self, source: ArcSubdomainSource) -> Self {
        self.subdomains = Some(source);
        self
    }

    /// Sets the port scanner.
    pub fn with_port_scanner<P: PortScanner + 'static>(mut self, scanner: P) -> Self {
        self.ports = Some(Arc::new(scanner));
        self
    }

    /// Sets the port scanner wrapped in an Arc.
    pub fn with_arc_port_scanner(mut self, scanner: ArcPortScanner) -> Self {
        self.ports = Some(scanner);
        self
    }

    /// Sets the HTTP prober.
    pub fn with_http_prober<H: HttpProber + 'static>(mut self, prober: H) -> Self {
        self.prober = Some(Arc::new(prober));
        self
    }

    /// Sets the HTTP prober wrapped in an Arc.
    pub fn with_arc_http_prober(mut self, prober: ArcHttpProber) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Sets where probe transcripts are written.
    pub fn with_transcripts(mut self, transcripts: TranscriptStore) -> Self {
        self.transcripts = Some(transcripts);
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> Result<ScanOrchestrator, ConfigError> {
        self.config.validate()?;

        let prober = self
            .prober
            .unwrap_or_else(|| Arc::new(Httpx::default()) as ArcHttpProber);
        let transcripts = self
            .transcripts
            .unwrap_or_else(|| TranscriptStore::new("."));

        let probe = ProbeStage::new(
            prober,
            transcripts,
            self.config.probe_ports.clone(),
            self.config.probe_concurrency,
            self.config.adapter_timeout,
        );

        Ok(ScanOrchestrator {
            subdomains: self
                .subdomains
                .unwrap_or_else(|| Arc::new(Subfinder::default())),
            ports: self.ports.unwrap_or_else(|| Arc::new(Nmap::default())),
            probe,
            store: ResultStore::new(),
            active: ActiveScans::default(),
            config: self.config,
        })
    }
}

impl Default for ScanOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequences the scan stages and publishes one record per scan.
///
/// Subdomain enumeration and the port scan run concurrently; HTTP probing
/// starts once subdomains are known and is skipped when there are none.
/// The three are joined and the assembled record is published to the
/// [`ResultStore`] in one step.
pub struct ScanOrchestrator {
    subdomains: ArcSubdomainSource,
    ports: ArcPortScanner,
    probe: ProbeStage,
    store: ResultStore,
    active: ActiveScans,
    config: OrchestratorConfig,
}

impl ScanOrchestrator {
    /// Creates a new builder.
    pub fn builder() -> ScanOrchestratorBuilder {
        ScanOrchestratorBuilder::new()
    }

    /// Starts a scan in the background and returns immediately.
    ///
    /// A scan of a domain that is already being scanned is allowed; both
    /// run, and whichever publishes last wins.
    pub fn start_scan(self: &Arc<Self>, domain: Domain) -> ScanHandle {
        let (id, token) = self.active.register(&domain);
        let (tx, rx) = watch::channel(None);
        let handle = ScanHandle::new(id.clone(), domain.clone(), token.clone(), rx);

        audit::emit_scan_started(&id, &domain);

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let record = orchestrator.run_scan(&id, &domain, &token).await;
            tx.send_replace(Some(record));
        });

        handle
    }

    /// Returns where a domain stands.
    pub fn status(&self, domain: &str) -> ScanStatus {
        if let Some(record) = self.store.lookup(domain) {
            return ScanStatus::Finished(record);
        }
        if self.active.is_active(domain) {
            return ScanStatus::Scanning;
        }
        ScanStatus::Pending
    }

    /// Cancels every in-flight scan of a domain.
    ///
    /// Each cancelled scan publishes a failed record. Returns how many scans
    /// were signalled.
    pub fn cancel(&self, domain: &str) -> usize {
        let cancelled = self.active.cancel(domain);
        audit::emit_scan_cancelled(domain, cancelled);
        cancelled
    }

    /// Checks whether each adapter's tool is installed.
    pub async fn health_report(&self) -> HealthReport {
        let prober = self.probe.prober();
        let (subdomains, ports, probe) = tokio::join!(
            self.subdomains.health_check(),
            self.ports.health_check(),
            prober.health_check(),
        );

        let mut tools = BTreeMap::new();
        tools.insert(self.subdomains.name().to_string(), subdomains.is_ok());
        tools.insert(self.ports.name().to_string(), ports.is_ok());
        tools.insert(prober.name().to_string(), probe.is_ok());

        HealthReport { tools }
    }

    /// Returns the store records are published to.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Returns the probe transcript store.
    pub fn transcripts(&self) -> &TranscriptStore {
        self.probe.transcripts()
    }

    /// Returns the number of scans in flight.
    pub fn active_scans(&self) -> usize {
        self.active.count()
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    async fn run_scan(&self, id: &str, domain: &Domain, token: &CancellationToken) -> Arc<ScanRecord> {
        let started_at = Utc::now();

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(Abort::Cancelled),
            joined = tokio::time::timeout(self.config.scan_timeout, self.run_stages(id, domain)) => {
                joined.map_err(|_| Abort::DeadlineExceeded(self.config.scan_timeout))
            }
        };

        let record = match outcome {
            Ok(findings) => ScanRecord::completed(id, domain, findings, started_at),
            Err(abort) => {
                tracing::warn!(scan_id = %id, domain = %domain, reason = %abort.reason(), "Scan aborted");
                ScanRecord::failed(id, domain, abort.reason(), started_at)
            }
        };

        // Publish before leaving the registry so readers never fall back to
        // `Pending` in between.
        let record = self.store.publish(record);
        self.active.finish(domain.as_str(), id);

        audit::emit_scan_published(&record);
        record
    }

    async fn run_stages(&self, id: &str, domain: &Domain) -> StageFindings {
        let discovery = async {
            let subdomains = self.enumerate_subdomains(id, domain).await;
            let probe_results = if subdomains.is_empty() {
                tracing::debug!(scan_id = %id, domain = %domain, "No subdomains, skipping HTTP probing");
                Vec::new()
            } else {
                self.probe.run(id, domain, &subdomains).await
            };
            (subdomains, probe_results)
        };

        let ((subdomains, probe_results), open_ports) =
            tokio::join!(discovery, self.scan_ports(id, domain));

        StageFindings {
            subdomains,
            open_ports,
            probe_results,
        }
    }

    async fn enumerate_subdomains(&self, id: &str, domain: &Domain) -> Vec<String> {
        let source = &self.subdomains;
        match bounded(source.name(), self.config.adapter_timeout, source.enumerate(domain)).await {
            Ok(subdomains) => subdomains,
            Err(e) => {
                audit::emit_stage_degraded(id, domain, ScanStage::Subdomains, &e);
                Vec::new()
            }
        }
    }

    async fn scan_ports(&self, id: &str, domain: &Domain) -> Vec<OpenPort> {
        let scanner = &self.ports;
        match bounded(scanner.name(), self.config.adapter_timeout, scanner.scan_ports(domain)).await {
            Ok(open_ports) => open_ports,
            Err(e) => {
                audit::emit_stage_degraded(id, domain, ScanStage::Ports, &e);
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("subdomains", &self.subdomains.name())
            .field("ports", &self.ports.name())
            .field("prober", &self.probe.prober().name())
            .field("published", &self.store.len())
            .field("active", &self.active.count())
            .field("config", &self.config)
            .finish()
    }
}
