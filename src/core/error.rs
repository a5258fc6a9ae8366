//! Error types for the reconbridge library.
//!
//! Every fault an external tool can produce is captured as an
//! [`AdapterError`]. The orchestrator absorbs these into empty results, so
//! the only errors that reach a caller are input and configuration faults.

use std::time::Duration;
use thiserror::Error;

/// Error returned by an external tool adapter.
///
/// Adapter errors never abort a scan. They are logged and turned into an
/// empty result (or the `"Error"` status token for a probed pair).
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The backing tool could not be found on `PATH`.
    #[error("tool '{tool}' is not installed")]
    ToolUnavailable {
        /// Name of the missing tool.
        tool: String,
    },

    /// The tool ran but exited with a failure status.
    #[error("tool '{tool}' exited with {}: {output}", describe_exit(.code))]
    ExitFailure {
        /// Name of the tool.
        tool: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed combined output of the failed run.
        output: String,
    },

    /// The invocation did not finish within its time budget.
    #[error("tool '{tool}' timed out after {elapsed:?}")]
    Timeout {
        /// Name of the tool.
        tool: String,
        /// The budget that elapsed.
        elapsed: Duration,
    },

    /// Spawning or reading from the tool failed.
    #[error("I/O error running '{tool}': {source}")]
    Io {
        /// Name of the tool.
        tool: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AdapterError {
    /// Creates a `ToolUnavailable` error.
    pub fn tool_unavailable(tool: impl Into<String>) -> Self {
        Self::ToolUnavailable { tool: tool.into() }
    }

    /// Creates an `ExitFailure` error.
    pub fn exit_failure(tool: impl Into<String>, code: Option<i32>, output: impl Into<String>) -> Self {
        Self::ExitFailure {
            tool: tool.into(),
            code,
            output: output.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(tool: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            tool: tool.into(),
            elapsed,
        }
    }

    /// Creates an `Io` error.
    pub fn io(tool: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            tool: tool.into(),
            source,
        }
    }

    /// Returns the name of the tool this error is about.
    pub fn tool(&self) -> &str {
        match self {
            Self::ToolUnavailable { tool }
            | Self::ExitFailure { tool, .. }
            | Self::Timeout { tool, .. }
            | Self::Io { tool, .. } => tool,
        }
    }

    /// Returns `true` if the tool is missing rather than misbehaving.
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, Self::ToolUnavailable { .. })
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

/// A domain that failed the syntax check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The domain was empty.
    #[error("domain is empty")]
    Empty,

    /// The domain contained whitespace.
    #[error("domain '{0}' contains whitespace")]
    ContainsWhitespace(String),

    /// The domain has no `.` separator.
    #[error("domain '{0}' has no label separator")]
    MissingSeparator(String),

    /// The domain starts with `-` and would be read as a tool option.
    #[error("domain '{0}' starts with '-'")]
    LeadingHyphen(String),
}

/// Error type for probe transcript files.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The domain cannot be turned into a safe file name.
    #[error("'{name}' is not a valid artifact name")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// No transcript exists for the domain.
    #[error("no artifact found for '{domain}'")]
    NotFound {
        /// Domain whose transcript was requested.
        domain: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid orchestrator or gateway configuration.
#[derive(Debug, Error)]
#[error("configuration error: {message}")]
pub struct ConfigError {
    /// Description of the problem.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for transcript operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_tool() {
        let err = AdapterError::tool_unavailable("nmap");
        assert_eq!(err.tool(), "nmap");
        assert!(err.is_tool_missing());

        let err = AdapterError::timeout("httpx", Duration::from_secs(5));
        assert_eq!(err.tool(), "httpx");
        assert!(!err.is_tool_missing());
    }

    #[test]
    fn test_exit_failure_display() {
        let err = AdapterError::exit_failure("subfinder", Some(2), "bad flag");
        let text = err.to_string();
        assert!(text.contains("subfinder"));
        assert!(text.contains('2'));
        assert!(text.contains("bad flag"));

        let killed = AdapterError::exit_failure("nmap", None, "");
        assert!(killed.to_string().contains("signal"));
    }

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::MissingSeparator("localhost".into());
        assert!(err.to_string().contains("localhost"));

        let err = DomainError::LeadingHyphen("-oN/tmp/x.txt".into());
        assert!(err.to_string().contains("starts with '-'"));
    }
}
