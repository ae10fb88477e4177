//! Load payload → fetch → rewrite → persist.
//!
//! [`render`] runs every stage except the write; [`regenerate`] adds the
//! write. Nothing reads or writes the destination until the whole plan has
//! succeeded.

use crate::config::RegenConfig;
use crate::fetch::{ArtifactSource, FetchError};
use crate::payload::{load_payload, AugmentationPayload, PayloadError};
use crate::persist::{write_artifact, PersistError};
use crate::rewrite::{RewritePlan, RuleError, StepTrace};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RegenError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl RegenError {
    /// Pipeline stage that failed, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            RegenError::Payload(_) => "load payload",
            RegenError::Fetch(_) => "fetch",
            RegenError::Rule(_) => "rewrite",
            RegenError::Persist(_) => "persist",
        }
    }
}

/// The regenerated artifact, not yet written.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub destination: PathBuf,
    pub payload: AugmentationPayload,
    pub text: String,
    pub trace: Vec<StepTrace>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
#[must_use = "RegenReport carries the per-rule trace"]
pub struct RegenReport {
    pub destination: PathBuf,
    pub bytes_written: usize,
    pub trace: Vec<StepTrace>,
}

/// Produce the final artifact text without touching the destination.
pub fn render(
    config: &RegenConfig,
    root: &Path,
    source: &dyn ArtifactSource,
) -> Result<Rendered, RegenError> {
    let payload = load_payload(
        &config.augmentation_file(root),
        &config.marker,
        &config.self_import,
    )?;

    let raw = source.fetch(&config.url)?;
    info!(length = raw.len(), "content fetched");

    let plan = RewritePlan::standard(config, &payload);
    let (text, trace) = plan.apply_traced(&raw)?;

    Ok(Rendered {
        destination: config.destination_file(root),
        payload,
        text,
        trace,
    })
}

/// Render and write the artifact.
pub fn regenerate(
    config: &RegenConfig,
    root: &Path,
    source: &dyn ArtifactSource,
) -> Result<RegenReport, RegenError> {
    let rendered = render(config, root, source)?;
    write_artifact(&rendered.destination, &rendered.text)?;
    info!(path = %rendered.destination.display(), "finished regeneration");

    Ok(RegenReport {
        bytes_written: rendered.text.len(),
        destination: rendered.destination,
        trace: rendered.trace,
    })
}
