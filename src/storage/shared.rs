// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared upload folder
//!
//! Both services read and write the same directory: the UI service stores the
//! raw upload, the AI service stores its own copy plus the `boxed_` output.
//! Files are never cleaned up and same-named uploads overwrite each other.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Prefix of annotated copies
pub const ANNOTATED_PREFIX: &str = "boxed_";

/// URL prefix under which the folder is served
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Handle to the shared upload folder
#[derive(Debug, Clone)]
pub struct SharedStorage {
    root: PathBuf,
}

impl SharedStorage {
    /// Open the folder, creating it (and parents) if missing
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage = Self { root: root.into() };
        storage.ensure_dir().await?;
        Ok(storage)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recreate the folder if it disappeared since startup
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))
    }

    /// Path a (sanitized) filename maps to inside the folder
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = sanitize_filename(filename)?;
        Ok(self.root.join(name))
    }

    /// Write `bytes` under `filename`, replacing any existing file
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(filename)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))
    }
}

/// Reduce a client-supplied filename to a single safe path component
///
/// Directory parts are dropped (`../../etc/passwd` becomes `passwd`, and
/// Windows-style `C:\\x\\cat.jpg` becomes `cat.jpg`). Empty names, `.`, `..`
/// and names containing NUL are rejected.
pub fn sanitize_filename(filename: &str) -> Result<String, StorageError> {
    let invalid = || StorageError::InvalidFilename(filename.to_string());

    if filename.contains('\0') {
        return Err(invalid());
    }

    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();

    match Path::new(last).components().next() {
        Some(Component::Normal(_)) if Path::new(last).components().count() == 1 => {
            Ok(last.to_string())
        }
        _ => Err(invalid()),
    }
}

/// Name of the annotated copy for an upload
pub fn annotated_name(filename: &str) -> String {
    format!("{}{}", ANNOTATED_PREFIX, filename)
}

/// Public URL path of a stored file
pub fn public_url(filename: &str) -> String {
    format!("{}/{}", UPLOADS_ROUTE, filename)
}

/// Final path segment of a URL path (`/uploads/boxed_a.jpg` -> `boxed_a.jpg`)
pub fn url_basename(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}
