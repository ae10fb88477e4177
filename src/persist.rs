//! Persister: the only stage that touches the destination path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Create missing ancestors of `path`, then replace its contents with `text`
/// encoded as UTF-8.
pub fn write_artifact(path: &Path, text: &str) -> Result<(), PersistError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), bytes = text.len(), "writing artifact");
    atomic_write(parent, path, text.as_bytes()).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Tempfile in the destination directory + fsync + rename.
///
/// The new file keeps the permissions of the file it replaces; a fresh file
/// gets the usual 0644 instead of the tempfile's 0600.
fn atomic_write(parent: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;

    match fs::metadata(path) {
        Ok(existing) => temp.as_file().set_permissions(existing.permissions())?,
        Err(_) => set_default_permissions(temp.as_file())?,
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
