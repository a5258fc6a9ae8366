//! Process invocation shared by the tool adapters.
//!
//! Every external tool is run through [`ToolCommand`]: the program is
//! resolved on `PATH` first, so a missing tool is reported as
//! [`AdapterError::ToolUnavailable`] instead of a spawn failure, and the
//! child is killed if the invoking future is dropped (timeout or scan
//! cancellation).

use crate::core::AdapterError;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A prepared invocation of one external tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    tool: String,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Creates a command for `program`, reported under the name `tool`.
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the name the tool is reported under.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Resolves the program on `PATH`.
    pub fn resolve(&self) -> Result<PathBuf, AdapterError> {
        which::which(&self.program).map_err(|e| {
            tracing::debug!(tool = %self.tool, program = ?self.program, error = %e, "Tool lookup failed");
            AdapterError::tool_unavailable(&self.tool)
        })
    }

    /// Runs the command to completion and returns its standard output.
    ///
    /// # Errors
    ///
    /// - `ToolUnavailable` if the program cannot be resolved.
    /// - `Io` if spawning or collecting output fails.
    /// - `ExitFailure` if the process exits unsuccessfully.
    pub async fn run(&self) -> Result<String, AdapterError> {
        let program = self.resolve()?;

        tracing::debug!(tool = %self.tool, args = ?self.args, "Invoking tool");

        let output = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AdapterError::io(&self.tool, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(AdapterError::exit_failure(
                &self.tool,
                output.status.code(),
                detail,
            ));
        }

        Ok(stdout)
    }
}

/// Returns `Ok(())` if `program` resolves on `PATH`.
pub(crate) fn ensure_installed(tool: &str, program: &Path) -> Result<(), AdapterError> {
    ToolCommand::new(tool, program).resolve().map(|_| ())
}
