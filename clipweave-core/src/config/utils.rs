//! Configuration utility functions
//!
//! This module provides helper functions for reading configuration values
//! from environment variables.

use std::path::PathBuf;

/// Get a path value from an environment variable or use the default
pub fn get_env_path(key: &str, default: PathBuf) -> PathBuf {
    get_env_opt_path(key).unwrap_or(default)
}

/// Get a path value from an environment variable; empty values count as unset
pub fn get_env_opt_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .map(PathBuf::from)
}

/// Get a u32 value from an environment variable or use the default
pub fn get_env_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value '{val}' for {key}");
            default
        }),
        Err(_) => default,
    }
}

/// Get a boolean value from an environment variable or use the default
pub fn get_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => val.to_lowercase() == "true" || val == "1",
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names so they can run in parallel.

    #[test]
    fn test_unset_variables_use_defaults() {
        assert_eq!(get_env_u32("CLIPWEAVE_TEST_UNSET_U32", 7), 7);
        assert!(get_env_bool("CLIPWEAVE_TEST_UNSET_BOOL", true));
        assert_eq!(get_env_opt_path("CLIPWEAVE_TEST_UNSET_PATH"), None);
        assert_eq!(
            get_env_path("CLIPWEAVE_TEST_UNSET_PATH", PathBuf::from("/d")),
            PathBuf::from("/d")
        );
    }

    #[test]
    fn test_set_variables_override() {
        // SAFETY: the variables are unique to this test.
        unsafe {
            std::env::set_var("CLIPWEAVE_TEST_SET_U32", "44100");
            std::env::set_var("CLIPWEAVE_TEST_BAD_U32", "fast");
            std::env::set_var("CLIPWEAVE_TEST_SET_PATH", "/srv/storage");
            std::env::set_var("CLIPWEAVE_TEST_EMPTY_PATH", "");
            std::env::set_var("CLIPWEAVE_TEST_SET_BOOL", "1");
        }

        assert_eq!(get_env_u32("CLIPWEAVE_TEST_SET_U32", 48000), 44100);
        assert_eq!(get_env_u32("CLIPWEAVE_TEST_BAD_U32", 48000), 48000);
        assert_eq!(
            get_env_opt_path("CLIPWEAVE_TEST_SET_PATH"),
            Some(PathBuf::from("/srv/storage"))
        );
        assert_eq!(get_env_opt_path("CLIPWEAVE_TEST_EMPTY_PATH"), None);
        assert!(get_env_bool("CLIPWEAVE_TEST_SET_BOOL", false));
    }
}
