//! External formatting collaborators
//!
//! The aggregation and per-file split steps are separate programs. This module
//! runs them, drains their output streams to completion, and surfaces that
//! output in the log.

use crate::config::FormatterConfig;
use crate::{HarvestError, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Everything a finished collaborator wrote
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `program` with `args` and collects both output streams to completion
///
/// A non-zero exit status is an error carrying the captured stderr.
pub async fn run_collaborator<I, S>(program: &str, args: I) -> Result<ProcessOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| HarvestError::Collaborator {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    let result = ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    surface_output(program, &result);

    if !result.status.success() {
        return Err(HarvestError::Collaborator {
            program: program.to_string(),
            message: format!("exited with {}: {}", result.status, result.stderr.trim()),
        });
    }

    Ok(result)
}

/// Logs captured output: stdout at info, stderr at warn
fn surface_output(program: &str, output: &ProcessOutput) {
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        tracing::info!("{} output: {}", program, stdout);
    }

    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        tracing::warn!("{} error output: {}", program, stderr);
    }
}

/// Invokes the configured formatting scripts
#[derive(Debug, Clone)]
pub struct Formatter {
    config: FormatterConfig,
}

impl Formatter {
    /// Returns `None` when the collaborators are disabled
    pub fn from_config(config: &FormatterConfig) -> Option<Self> {
        config.enabled.then(|| Self {
            config: config.clone(),
        })
    }

    /// Aggregates every cleaned file in `csv_dir` into `output_path`
    ///
    /// Returns `Ok(None)` if no format script is configured.
    pub async fn format_directory(
        &self,
        csv_dir: &Path,
        output_path: &Path,
    ) -> Result<Option<ProcessOutput>> {
        let Some(script) = &self.config.format_script else {
            return Ok(None);
        };

        tracing::info!(
            "Formatting {} into {}",
            csv_dir.display(),
            output_path.display()
        );
        let args = [
            OsStr::new(script),
            csv_dir.as_os_str(),
            output_path.as_os_str(),
        ];
        run_collaborator(&self.config.program, args).await.map(Some)
    }

    /// Runs the split step on a freshly written file, in place
    ///
    /// Returns `Ok(None)` if no split script is configured.
    pub async fn split_file(&self, path: &Path) -> Result<Option<ProcessOutput>> {
        let Some(script) = &self.config.split_script else {
            return Ok(None);
        };

        let args = [OsStr::new(script), path.as_os_str(), path.as_os_str()];
        run_collaborator(&self.config.program, args).await.map(Some)
    }
}
