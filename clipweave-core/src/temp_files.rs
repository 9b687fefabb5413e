//! Temporary file management utilities.
//!
//! This module provides helper functions for creating and naming temporary
//! artifacts. Files created here are job-unique so concurrent jobs sharing a
//! storage directory never collide, and the `tempfile` handles clean up on
//! drop, including on error paths.

use crate::error::{CoreError, CoreResult};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Creates a temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

/// Generates a job id of the form `YYYYmmdd_HHMMSS_xxxxxxxx`.
pub fn generate_job_id() -> String {
    format!(
        "{}_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        random_suffix(8).to_lowercase()
    )
}

/// Returns the caller's job id, or a generated one when it is absent or blank.
///
/// Job ids name files inside the temp and output directories, so an id that
/// contains a path separator or `..` is `InvalidInput`.
pub fn resolve_job_id(requested: Option<&str>) -> CoreResult<String> {
    let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(generate_job_id());
    };
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        return Err(CoreError::InvalidInput(format!(
            "job id '{id}' must not contain path separators or '..'"
        )));
    }
    Ok(id.to_string())
}

fn random_suffix(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_file_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let file = create_temp_file(dir.path(), "concat_list", "txt").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_job_ids_differ() {
        let a = generate_job_id();
        let b = generate_job_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), "20260101_120000_".len() + 8);
    }

    #[test]
    fn test_resolve_job_id() {
        assert_eq!(resolve_job_id(Some(" promo.v2 ")).unwrap(), "promo.v2");
        assert_eq!(resolve_job_id(Some("")).unwrap().len(), 24);
        assert_eq!(resolve_job_id(None).unwrap().len(), 24);
        for bad in ["../escape", "/abs/job", "a/b", "a\\b", ".."] {
            assert!(
                matches!(resolve_job_id(Some(bad)), Err(CoreError::InvalidInput(_))),
                "{bad}"
            );
        }
    }
}
