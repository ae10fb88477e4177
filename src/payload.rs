//! Static payload loader.
//!
//! The augmentation file is a small helper class whose imports and method
//! bodies are merged into the regenerated artifact. Everything before the
//! line declaring the container is the import block; everything after it is
//! the method-body block (which still carries the container's closing brace,
//! so it can stand in for the artifact's own closing brace).

use crate::fetch::normalize_newlines;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("cannot read augmentation file {path}: {source}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("augmentation file {path} has no line declaring '{marker}'")]
    MissingMarker { path: PathBuf, marker: String },
}

/// Imports and method bodies lifted from the augmentation file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentationPayload {
    /// Lines before the container declaration, terminators preserved.
    pub imports: String,
    /// Lines after the container declaration, terminators preserved.
    pub method_bodies: String,
}

impl AugmentationPayload {
    /// Split `text` at the first line containing `marker`.
    ///
    /// CRLF terminators become LF, matching the fetched artifact. Returns
    /// `None` when no line contains the marker.
    pub fn parse(text: &str, marker: &str, self_import: &str) -> Option<Self> {
        let text = normalize_newlines(text);
        let mut payload = Self::default();
        let mut reached_container = false;

        for line in text.split_inclusive('\n') {
            if reached_container {
                payload.method_bodies.push_str(line);
            } else if line.contains(marker) {
                reached_container = true;
            } else if is_self_import(line, self_import) {
                debug!(line = line.trim_end(), "dropping self import");
            } else {
                payload.imports.push_str(line);
            }
        }

        reached_container.then_some(payload)
    }
}

/// True when `line` is `import <self_import>;`.
fn is_self_import(line: &str, self_import: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix("import") else {
        return false;
    };
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    rest.trim().trim_end_matches(';').trim_end() == self_import
}

/// Read the augmentation file at `path` and split it into an [`AugmentationPayload`].
pub fn load_payload(
    path: &Path,
    marker: &str,
    self_import: &str,
) -> Result<AugmentationPayload, PayloadError> {
    info!(path = %path.display(), "reading augmentation file");
    let text = fs::read_to_string(path).map_err(|source| PayloadError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!(lines = text.lines().count(), "read augmentation file");

    AugmentationPayload::parse(&text, marker, self_import).ok_or_else(|| {
        PayloadError::MissingMarker {
            path: path.to_path_buf(),
            marker: marker.to_string(),
        }
    })
}
