//! The HTTP probing stage.

use crate::artifact::TranscriptStore;
use crate::audit;
use crate::core::{ArcHttpProber, Domain, ProbeResult, ScanStage};
use crate::manager::orchestrator::bounded;

use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Probes every `(subdomain, port)` pair and records a transcript.
///
/// Pairs are probed with bounded concurrency but results come back in
/// subdomain-major order, the same order the transcript lines are written
/// in.
#[derive(Debug, Clone)]
pub(crate) struct ProbeStage {
    prober: ArcHttpProber,
    transcripts: TranscriptStore,
    ports: Vec<u16>,
    concurrency: usize,
    timeout: Duration,
}

impl ProbeStage {
    pub(crate) fn new(
        prober: ArcHttpProber,
        transcripts: TranscriptStore,
        ports: Vec<u16>,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            prober,
            transcripts,
            ports,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub(crate) fn prober(&self) -> &ArcHttpProber {
        &self.prober
    }

    pub(crate) fn transcripts(&self) -> &TranscriptStore {
        &self.transcripts
    }

    /// Runs the stage. Never fails: a missing prober yields no results, a
    /// faulting pair yields the `"Error"` status.
    pub(crate) async fn run(
        &self,
        scan_id: &str,
        domain: &Domain,
        subdomains: &[String],
    ) -> Vec<ProbeResult> {
        if let Err(e) = self.prober.health_check().await {
            audit::emit_stage_degraded(scan_id, domain, ScanStage::Probe, &e);
            return Vec::new();
        }

        tracing::info!(
            scan_id = %scan_id,
            domain = %domain,
            subdomains = subdomains.len(),
            ports = ?self.ports,
            "Starting HTTP probing"
        );

        let mut transcript = match self.transcripts.create(domain.as_str()).await {
            Ok(transcript) => Some(transcript),
            Err(e) => {
                tracing::warn!(
                    scan_id = %scan_id,
                    domain = %domain,
                    error = %e,
                    "Could not create transcript, probing without it"
                );
                None
            }
        };

        let pairs: Vec<(String, u16)> = subdomains
            .iter()
            .flat_map(|host| self.ports.iter().map(move |port| (host.clone(), *port)))
            .collect();

        let mut probes = stream::iter(pairs)
            .map(|(host, port)| async move { self.probe_pair(&host, port).await })
            .buffered(self.concurrency);

        let mut results = Vec::with_capacity(subdomains.len() * self.ports.len());
        while let Some(result) = probes.next().await {
            if let Some(transcript) = transcript.as_mut() {
                if let Err(e) = transcript.append(&result).await {
                    tracing::warn!(
                        domain = %domain,
                        path = %transcript.path().display(),
                        error = %e,
                        "Failed to append to transcript"
                    );
                }
            }
            results.push(result);
        }

        if let Some(transcript) = transcript {
            if let Err(e) = transcript.finish().await {
                tracing::warn!(domain = %domain, error = %e, "Failed to flush transcript");
            }
        }

        tracing::info!(
            scan_id = %scan_id,
            domain = %domain,
            count = results.len(),
            errors = results.iter().filter(|r| r.is_error()).count(),
            "HTTP probing finished"
        );

        results
    }

    async fn probe_pair(&self, host: &str, port: u16) -> ProbeResult {
        match bounded(self.prober.name(), self.timeout, self.prober.probe(host, port)).await {
            Ok(status) => ProbeResult::new(host, port, status),
            Err(e) => {
                tracing::debug!(host = %host, port, error = %e, "Probe failed");
                ProbeResult::errored(host, port)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockHttpProber;
    use std::sync::Arc;

    fn domain() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    fn subdomains() -> Vec<String> {
        vec!["a.example.com".into(), "b.example.com".into()]
    }

    fn stage(prober: Arc<MockHttpProber>, dir: &std::path::Path, concurrency: usize) -> ProbeStage {
        ProbeStage::new(
            prober,
            TranscriptStore::new(dir),
            vec![80, 443],
            concurrency,
            Duration::from_secs(5),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_cross_product_in_order() {
        let dir = tempfile::tempdir().unwrap();
        // Earlier pairs finish last, so completion order is the reverse of
        // the order results must come back in.
        let prober = Arc::new(
            MockHttpProber::new()
                .with_response("a.example.com", 443, "301")
                .with_failure("b.example.com", 80)
                .with_pair_latency("a.example.com", 80, Duration::from_secs(3))
                .with_pair_latency("a.example.com", 443, Duration::from_secs(2))
                .with_pair_latency("b.example.com", 80, Duration::from_secs(1)),
        );
        let stage = stage(Arc::clone(&prober), dir.path(), 3);

        let results = stage.run("scan-1", &domain(), &subdomains()).await;

        assert_eq!(
            results,
            vec![
                ProbeResult::new("a.example.com", 80, "200"),
                ProbeResult::new("a.example.com", 443, "301"),
                ProbeResult::errored("b.example.com", 80),
                ProbeResult::new("b.example.com", 443, "200"),
            ]
        );
        assert_eq!(prober.probe_count(), 4);

        let transcript =
            std::fs::read_to_string(dir.path().join("example.com_status_codes.txt")).unwrap();
        assert_eq!(
            transcript,
            "a.example.com:80 - 200\n\
             a.example.com:443 - 301\n\
             b.example.com:80 - Error\n\
             b.example.com:443 - 200\n"
        );
    }

    #[tokio::test]
    async fn test_unavailable_prober_is_never_invoked() {
        let dir = tempfile::tempdir().unwrap();
        let prober = Arc::new(MockHttpProber::unavailable());
        let stage = stage(Arc::clone(&prober), dir.path(), 2);

        let results = stage.run("scan-2", &domain(), &subdomains()).await;

        assert!(results.is_empty());
        assert_eq!(prober.probe_count(), 0);
        assert!(!dir.path().join("example.com_status_codes.txt").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_pair_times_out_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let prober = Arc::new(MockHttpProber::new().with_latency(Duration::from_secs(60)));
        let stage = ProbeStage::new(
            prober,
            TranscriptStore::new(dir.path()),
            vec![80],
            1,
            Duration::from_secs(1),
        );

        let results = stage
            .run("scan-3", &domain(), &["a.example.com".to_string()])
            .await;

        assert_eq!(results, vec![ProbeResult::errored("a.example.com", 80)]);
    }

    #[tokio::test]
    async fn test_transcript_failure_does_not_stop_probing() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the artifact directory should be.
        let blocker = dir.path().join("artifacts");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let prober = Arc::new(MockHttpProber::new());
        let stage = stage(Arc::clone(&prober), &blocker, 2);

        let results = stage.run("scan-4", &domain(), &subdomains()).await;
        assert_eq!(results.len(), 4);
        assert_eq!(prober.probe_count(), 4);
    }
}
