//! Input asset retrieval.
//!
//! Clips arrive as URLs or paths and are materialized under the job's temp
//! directory before probing. The pipeline only depends on [`AssetFetcher`];
//! remote retrieval belongs to whoever embeds the library. Every fetched path
//! is owned by a [`FetchedInputs`] guard that deletes it when the job ends.

use crate::error::{CoreError, CoreResult};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Retrieves one clip to local storage.
pub trait AssetFetcher {
    /// Fetches `source` to a path derived from `destination_hint` and returns
    /// the local path actually written.
    fn fetch(&self, source: &str, destination_hint: &Path) -> CoreResult<PathBuf>;
}

/// Fetcher for local paths and `file://` URLs. Copies the source so the
/// job owns (and later deletes) its inputs without touching the originals.
#[derive(Debug, Clone, Default)]
pub struct LocalFileFetcher;

impl LocalFileFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl AssetFetcher for LocalFileFetcher {
    fn fetch(&self, source: &str, destination_hint: &Path) -> CoreResult<PathBuf> {
        let source_path = local_source_path(source)?;
        if !source_path.is_file() {
            return Err(CoreError::InvalidInput(format!(
                "input {} does not exist or is not a file",
                source_path.display()
            )));
        }

        // Appended, not replaced: the hint may itself contain dots.
        let destination = match source_path.extension() {
            Some(ext) => {
                let mut name = destination_hint.as_os_str().to_os_string();
                name.push(".");
                name.push(ext);
                PathBuf::from(name)
            }
            None => destination_hint.to_path_buf(),
        };
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!(
            "Fetching {} -> {}",
            source_path.display(),
            destination.display()
        );
        std::fs::copy(&source_path, &destination)?;
        Ok(destination)
    }
}

fn local_source_path(source: &str) -> CoreResult<PathBuf> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput("empty clip source".to_string()));
    }
    if let Some(path) = trimmed.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(CoreError::InvalidInput(format!(
            "unsupported URL scheme '{scheme}' for {trimmed}: only local paths and file:// URLs are fetched"
        )));
    }
    Ok(PathBuf::from(trimmed))
}

/// Owns the local copies of a job's inputs and removes them on drop.
#[derive(Debug, Default)]
pub struct FetchedInputs {
    paths: Vec<PathBuf>,
}

impl FetchedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a fetched path.
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Drop for FetchedInputs {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed fetched input {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove fetched input {}: {e}", path.display()),
            }
        }
    }
}

/// Fetches every source in order under `dir`, named `<job_id>_input_<i>`.
///
/// Files fetched before a failure are removed when the partial guard drops.
pub fn fetch_all<F: AssetFetcher>(
    fetcher: &F,
    sources: &[String],
    dir: &Path,
    job_id: &str,
) -> CoreResult<FetchedInputs> {
    let mut fetched = FetchedInputs::new();
    for (index, source) in sources.iter().enumerate() {
        let hint = dir.join(format!("{job_id}_input_{index}"));
        fetched.push(fetcher.fetch(source, &hint)?);
    }
    Ok(fetched)
}
