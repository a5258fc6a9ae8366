//! Concurrent store of published scan records.

use crate::core::ScanRecord;

use dashmap::DashMap;
use std::sync::Arc;

/// Domain-keyed store of the latest published [`ScanRecord`].
///
/// Records are held as immutable `Arc` snapshots in a sharded map: a
/// publish swaps the whole snapshot for its domain, so a reader sees either
/// the previous record or the new one, never a mix. Operations on different
/// domains only contend when they hash to the same shard, and then only for
/// the duration of a pointer swap or clone.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: DashMap<String, Arc<ScanRecord>>,
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a record under its domain, replacing any previous one.
    ///
    /// Returns the shared snapshot that readers will now observe.
    pub fn publish(&self, record: ScanRecord) -> Arc<ScanRecord> {
        let record = Arc::new(record);
        let previous = self
            .records
            .insert(record.domain.clone(), Arc::clone(&record));

        tracing::debug!(
            domain = %record.domain,
            scan_id = %record.id,
            replaced = ?previous.as_ref().map(|r| r.id.as_str()),
            "Record published"
        );

        record
    }

    /// Returns the latest record for a domain, if one was published.
    pub fn lookup(&self, domain: &str) -> Option<Arc<ScanRecord>> {
        self.records.get(domain).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the number of domains with a published record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the domains that have a published record.
    pub fn domains(&self) -> Vec<String> {
        self.records.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Domain, OpenPort, StageFindings};
    use chrono::Utc;

    fn record(domain: &str, id: &str, ports: &[u16]) -> ScanRecord {
        let domain = Domain::parse(domain).unwrap();
        let findings = StageFindings {
            open_ports: ports.iter().copied().map(OpenPort::new).collect(),
            ..StageFindings::default()
        };
        ScanRecord::completed(id, &domain, findings, Utc::now())
    }

    #[test]
    fn test_lookup_missing() {
        let store = ResultStore::new();
        assert!(store.lookup("example.com").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_publish_then_lookup() {
        let store = ResultStore::new();
        let published = store.publish(record("example.com", "scan-1", &[80]));

        let found = store.lookup("example.com").unwrap();
        assert!(Arc::ptr_eq(&published, &found));
        assert_eq!(found.open_ports.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_publish_overwrites() {
        let store = ResultStore::new();
        store.publish(record("example.com", "scan-1", &[80]));
        store.publish(record("example.com", "scan-2", &[80, 443]));

        let found = store.lookup("example.com").unwrap();
        assert_eq!(found.id, "scan-2");
        assert_eq!(found.open_ports.len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_old_snapshot_survives_overwrite() {
        let store = ResultStore::new();
        store.publish(record("example.com", "scan-1", &[80]));
        let held = store.lookup("example.com").unwrap();

        store.publish(record("example.com", "scan-2", &[443]));
        assert_eq!(held.id, "scan-1");
        assert_eq!(held.open_ports, vec![OpenPort::new(80)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_see_whole_records() {
        let store = Arc::new(ResultStore::new());
        let mut tasks = Vec::new();

        for i in 0..8u16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                for round in 0..200u16 {
                    let domain = format!("d{i}.example.com");
                    let n = (round % 4) + 1;
                    let ports: Vec<u16> = (0..n).collect();
                    store.publish(record(&domain, &format!("{round}"), &ports));

                    let seen = store.lookup(&domain).unwrap();
                    let expected: u16 = seen.id.parse::<u16>().unwrap() % 4 + 1;
                    assert_eq!(seen.open_ports.len(), expected as usize);
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        let mut domains = store.domains();
        domains.sort();
        assert_eq!(domains.len(), 8);
        assert_eq!(domains[0], "d0.example.com");
    }
}
