//! Filesystem-backed probe transcripts.

use crate::core::error::{ArtifactError, ArtifactResult};
use crate::core::ProbeResult;

use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Suffix appended to the domain to form the transcript file name.
pub const TRANSCRIPT_SUFFIX: &str = "_status_codes.txt";

/// Directory of per-domain probe transcripts.
///
/// # Directory Structure
///
/// ```text
/// artifacts/
/// ├── example.com_status_codes.txt
/// └── example.org_status_codes.txt
/// ```
///
/// Each file holds one `host:port - status` line per probed pair of the
/// most recent scan of that domain.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    base_path: PathBuf,
}

impl TranscriptStore {
    /// Creates a store rooted at `base_path`. The directory is created
    /// lazily, on the first transcript.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the directory transcripts are written to.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the file name used for a domain's transcript.
    pub fn file_name(domain: &str) -> ArtifactResult<String> {
        let unsafe_name = domain.is_empty()
            || domain.starts_with('.')
            || domain.contains("..")
            || domain
                .chars()
                .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());

        if unsafe_name {
            return Err(ArtifactError::InvalidName {
                name: domain.to_string(),
            });
        }

        Ok(format!("{domain}{TRANSCRIPT_SUFFIX}"))
    }

    /// Returns the path of a domain's transcript.
    pub fn path_for(&self, domain: &str) -> ArtifactResult<PathBuf> {
        Ok(self.base_path.join(Self::file_name(domain)?))
    }

    /// Creates (or truncates) the transcript for a domain.
    pub async fn create(&self, domain: &str) -> ArtifactResult<Transcript> {
        let path = self.path_for(domain)?;
        tokio::fs::create_dir_all(&self.base_path).await?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;

        tracing::debug!(domain = %domain, path = %path.display(), "Transcript created");

        Ok(Transcript {
            path,
            file,
            lines: 0,
        })
    }

    /// Opens a domain's transcript for reading.
    pub async fn open(&self, domain: &str) -> ArtifactResult<File> {
        let path = self.path_for(domain)?;
        File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArtifactError::NotFound {
                domain: domain.to_string(),
            },
            _ => ArtifactError::Io(e),
        })
    }

    /// Returns `true` if a transcript exists for the domain.
    pub async fn exists(&self, domain: &str) -> bool {
        match self.path_for(domain) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}

/// An open transcript, appended to line by line.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    file: File,
    lines: usize,
}

impl Transcript {
    /// Appends one probe result as a `host:port - status` line.
    pub async fn append(&mut self, result: &ProbeResult) -> ArtifactResult<()> {
        let mut line = result.transcript_line();
        line.push('\n');
        self.file.write_all(line.as_bytes()).await?;
        self.lines += 1;
        Ok(())
    }

    /// Flushes buffered writes to disk.
    pub async fn finish(mut self) -> ArtifactResult<usize> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.lines)
    }

    /// Returns the transcript path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_file_name() {
        assert_eq!(
            TranscriptStore::file_name("example.com").unwrap(),
            "example.com_status_codes.txt"
        );
    }

    #[test]
    fn test_file_name_rejects_traversal() {
        for bad in ["", "../etc.passwd", "a/b.com", "a\\b.com", ".hidden.com", "a..b.com"] {
            assert!(
                matches!(
                    TranscriptStore::file_name(bad),
                    Err(ArtifactError::InvalidName { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path().join("artifacts"));

        let mut transcript = store.create("example.com").await.unwrap();
        transcript
            .append(&ProbeResult::new("a.example.com", 80, "200"))
            .await
            .unwrap();
        transcript
            .append(&ProbeResult::errored("a.example.com", 443))
            .await
            .unwrap();
        assert_eq!(transcript.finish().await.unwrap(), 2);

        let mut contents = String::new();
        store
            .open("example.com")
            .await
            .unwrap()
            .read_to_string(&mut contents)
            .await
            .unwrap();
        assert_eq!(contents, "a.example.com:80 - 200\na.example.com:443 - Error\n");
        assert!(store.exists("example.com").await);
    }

    #[tokio::test]
    async fn test_create_truncates_previous_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        let mut first = store.create("example.com").await.unwrap();
        first
            .append(&ProbeResult::new("old.example.com", 80, "500"))
            .await
            .unwrap();
        first.finish().await.unwrap();

        let second = store.create("example.com").await.unwrap();
        assert_eq!(second.finish().await.unwrap(), 0);

        let contents = tokio::fs::read_to_string(store.path_for("example.com").unwrap())
            .await
            .unwrap();
        assert!(contents.is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());

        assert!(matches!(
            store.open("example.com").await,
            Err(ArtifactError::NotFound { .. })
        ));
        assert!(!store.exists("example.com").await);
    }
}
