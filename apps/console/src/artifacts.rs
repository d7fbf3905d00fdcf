//! Fetches the resources a finished workflow links to into a local directory.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use client_core::{AnalysisBackend, ClientError};
use shared::{domain::SampleFilename, routes};
use tracing::{info, warn};

use crate::{controller::events::WorkflowKind, view::Interface};

/// Triggers whose successful completion should be saved, by generation.
#[derive(Debug, Default)]
pub struct PendingSaves(HashSet<(WorkflowKind, u64)>);

impl PendingSaves {
    pub fn request(&mut self, workflow: WorkflowKind, generation: u64) {
        self.0.insert((workflow, generation));
    }

    /// Clears the request for this completion, reporting whether one existed.
    pub fn take(&mut self, workflow: WorkflowKind, generation: u64) -> bool {
        self.0.remove(&(workflow, generation))
    }
}

/// Outcome of saving a results panel; each target succeeds or fails alone.
#[derive(Debug, Default)]
pub struct SessionSave {
    pub saved: Vec<PathBuf>,
    /// Targets the server has nothing for, such as the report of a clean run.
    pub skipped: Vec<String>,
    pub failures: Vec<String>,
}

async fn write_artifact(out_dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create output directory '{}'", out_dir.display()))?;
    let path = out_dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    info!(path = %path.display(), size = bytes.len(), "saved artifact");
    Ok(path)
}

/// Saves the generated sample under its server-assigned name.
pub async fn save_sample(
    backend: &dyn AnalysisBackend,
    filename: &SampleFilename,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    // Only the final component; the name comes from the server.
    let local_name = Path::new(filename.as_str())
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("server returned unusable sample filename '{filename}'"))?;
    let href = routes::sample_download(filename);
    let bytes = backend
        .fetch_artifact(&href)
        .await
        .with_context(|| format!("failed to fetch {href}"))?;
    write_artifact(out_dir, local_name, &bytes).await
}

/// Saves both charts and the anomaly report bound in the results panel.
///
/// The backend only writes a report when anomalies were found, so a missing
/// report is recorded as skipped rather than failed.
pub async fn save_session(
    backend: &dyn AnalysisBackend,
    interface: &Interface,
    out_dir: &Path,
) -> anyhow::Result<SessionSave> {
    let session = interface
        .session
        .as_ref()
        .filter(|_| interface.results_visible)
        .ok_or_else(|| anyhow!("no analysis results to save"))?;

    let mut targets = Vec::new();
    if let Some(src) = &interface.scatter_src {
        targets.push((src.as_str(), format!("anomaly_scatter_{session}.png"), false));
    }
    if let Some(src) = &interface.distribution_src {
        targets.push((src.as_str(), format!("anomaly_distribution_{session}.png"), false));
    }
    if let Some(target) = interface.activate_download() {
        targets.push((target, format!("anomalies_{session}.csv"), true));
    }

    let mut outcome = SessionSave::default();
    for (href, file_name, is_report) in targets {
        match backend.fetch_artifact(href).await {
            Ok(bytes) => match write_artifact(out_dir, &file_name, &bytes).await {
                Ok(path) => outcome.saved.push(path),
                Err(err) => outcome.failures.push(format!("{err:#}")),
            },
            Err(ClientError::Status { status: 404, .. }) if is_report => {
                info!(%session, "no anomaly report on the server");
                outcome
                    .skipped
                    .push(format!("no anomaly report for this session ({session})"));
            }
            Err(err) => {
                warn!(href, "artifact fetch failed: {err}");
                outcome
                    .failures
                    .push(format!("failed to fetch {href}: {}", err.message()));
            }
        }
    }
    Ok(outcome)
}
