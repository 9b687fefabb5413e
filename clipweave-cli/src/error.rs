// ============================================================================
// clipweave-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING
//
// The CLI reports every failure as a `CoreError` so `main` can classify it
// (request mistakes vs. tool failures) with `CoreError::is_user_error`.
// Failures that originate in the CLI itself (reading a request file,
// creating the log directory, installing the logger) are wrapped with a
// short description of the step that failed.

use clipweave_core::{CoreError, CoreResult};
use std::fmt;

/// Result of a CLI step.
pub type CliResult<T> = CoreResult<T>;

/// Prefixes an error with the CLI step that produced it.
pub trait CliErrorContext<T> {
    fn cli_context<C: fmt::Display>(self, step: C) -> CliResult<T>;

    /// Like `cli_context`, building the description only on failure.
    fn cli_with_context<C: fmt::Display, F: FnOnce() -> C>(self, step: F) -> CliResult<T>;
}

impl<T, E: Into<CoreError>> CliErrorContext<T> for Result<T, E> {
    fn cli_context<C: fmt::Display>(self, step: C) -> CliResult<T> {
        self.cli_with_context(|| step)
    }

    fn cli_with_context<C: fmt::Display, F: FnOnce() -> C>(self, step: F) -> CliResult<T> {
        self.map_err(|e| {
            let cause: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {cause}", step()))
        })
    }
}

/// Builds an `OperationFailed` error from a format string.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        ::clipweave_core::CoreError::OperationFailed(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_names_the_failed_step() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.cli_context("Failed to read request").unwrap_err();
        assert_eq!(err.to_string(), "Failed to read request: I/O error: gone");
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_lazy_context() {
        let result: Result<(), CoreError> = Err(CoreError::Config("bad".to_string()));
        let err = result
            .cli_with_context(|| format!("Failed to open {}", "x.json"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to open x.json: Invalid configuration: bad"
        );
    }

    #[test]
    fn test_cli_error_macro() {
        let err = crate::cli_error!("Invalid request file {}: {}", "r.json", "eof");
        assert_eq!(err.to_string(), "Invalid request file r.json: eof");
    }
}
