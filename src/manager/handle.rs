//! Handles to running scans and the in-flight registry.

use crate::core::{Domain, ScanRecord};

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A handle to a scan started by the orchestrator.
///
/// Dropping the handle does not stop the scan. Use [`ScanHandle::cancel`]
/// for that.
#[derive(Debug, Clone)]
pub struct ScanHandle {
    /// Unique identifier for this scan.
    pub id: String,
    /// The domain being scanned.
    pub domain: Domain,
    token: CancellationToken,
    outcome: watch::Receiver<Option<Arc<ScanRecord>>>,
}

impl ScanHandle {
    pub(crate) fn new(
        id: String,
        domain: Domain,
        token: CancellationToken,
        outcome: watch::Receiver<Option<Arc<ScanRecord>>>,
    ) -> Self {
        Self {
            id,
            domain,
            token,
            outcome,
        }
    }

    /// Returns the record this scan published, if it has finished.
    pub fn record(&self) -> Option<Arc<ScanRecord>> {
        self.outcome.borrow().clone()
    }

    /// Returns `true` once this scan has published its record.
    pub fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Requests cancellation. The scan publishes a failed record.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the scan to publish and returns the record it published.
    ///
    /// Returns `None` only if the scan task went away without publishing,
    /// which happens when the runtime shuts down underneath it.
    pub async fn wait(mut self) -> Option<Arc<ScanRecord>> {
        match self.outcome.wait_for(Option::is_some).await {
            Ok(record) => record.clone(),
            Err(_) => None,
        }
    }
}

/// A scan that is registered as in flight.
#[derive(Debug, Clone)]
struct ActiveScan {
    id: String,
    token: CancellationToken,
}

/// Registry of scans that have started but not yet published.
///
/// Several scans of one domain may be in flight at once; each is tracked
/// under its own id.
#[derive(Debug, Default)]
pub(crate) struct ActiveScans {
    scans: DashMap<String, Vec<ActiveScan>>,
}

impl ActiveScans {
    /// Registers a new scan and returns its id and cancellation token.
    pub(crate) fn register(&self, domain: &Domain) -> (String, CancellationToken) {
        let id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();

        self.scans
            .entry(domain.as_str().to_string())
            .or_default()
            .push(ActiveScan {
                id: id.clone(),
                token: token.clone(),
            });

        (id, token)
    }

    /// Removes a finished scan.
    pub(crate) fn finish(&self, domain: &str, id: &str) {
        self.scans.remove_if_mut(domain, |_, scans| {
            scans.retain(|scan| scan.id != id);
            scans.is_empty()
        });
    }

    /// Returns `true` if any scan of the domain is in flight.
    pub(crate) fn is_active(&self, domain: &str) -> bool {
        self.scans
            .get(domain)
            .map(|scans| !scans.is_empty())
            .unwrap_or(false)
    }

    /// Cancels every in-flight scan of the domain, returning how many.
    pub(crate) fn cancel(&self, domain: &str) -> usize {
        self.scans
            .get(domain)
            .map(|scans| {
                scans.iter().for_each(|scan| scan.token.cancel());
                scans.len()
            })
            .unwrap_or(0)
    }

    /// Returns the number of scans in flight across all domains.
    pub(crate) fn count(&self) -> usize {
        self.scans.iter().map(|entry| entry.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain::parse("example.com").unwrap()
    }

    #[test]
    fn test_register_and_finish() {
        let active = ActiveScans::default();
        let (first, _) = active.register(&domain());
        let (second, _) = active.register(&domain());
        assert_ne!(first, second);
        assert!(active.is_active("example.com"));
        assert_eq!(active.count(), 2);

        active.finish("example.com", &first);
        assert!(active.is_active("example.com"));

        active.finish("example.com", &second);
        assert!(!active.is_active("example.com"));
        assert_eq!(active.count(), 0);
    }

    #[test]
    fn test_cancel_all_for_domain() {
        let active = ActiveScans::default();
        let (_, a) = active.register(&domain());
        let (_, b) = active.register(&domain());
        let (_, other) = active.register(&Domain::parse("example.org").unwrap());

        assert_eq!(active.cancel("example.com"), 2);
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert!(!other.is_cancelled());
        assert_eq!(active.cancel("unknown.com"), 0);
    }

    #[tokio::test]
    async fn test_handle_wait() {
        let (tx, rx) = watch::channel(None);
        let handle = ScanHandle::new("id".into(), domain(), CancellationToken::new(), rx);
        assert!(!handle.is_finished());

        let record = ScanRecord::failed("id", &domain(), "test", chrono::Utc::now());
        tx.send_replace(Some(Arc::new(record)));

        assert!(handle.is_finished());
        let published = handle.wait().await.unwrap();
        assert!(published.is_failed());
    }

    #[tokio::test]
    async fn test_handle_wait_without_publish() {
        let (tx, rx) = watch::channel(None);
        let handle = ScanHandle::new("id".into(), domain(), CancellationToken::new(), rx);
        drop(tx);
        assert!(handle.wait().await.is_none());
    }
}
