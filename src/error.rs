//! Domain-specific error types for swapctl.
//!
//! This module defines `SwapError`, a `thiserror`-based enum that
//! provides typed error variants for every fatal condition of a
//! provisioning run. Public API functions return `Result<T, SwapError>`
//! for programmatic error handling, while the executor trait boundary
//! and the binary continue to use `anyhow::Result`.
//!
//! `SwapError` implements `Into<anyhow::Error>`, so the `?` operator
//! converts it automatically at boundaries that return `anyhow::Result`.

use std::io;

/// Formats an IO error kind into a human-readable message.
///
/// Provides consistent, user-friendly messages for common IO error kinds
/// (e.g., "I/O error: not found") instead of the OS-level messages
/// (e.g., "No such file or directory (os error 2)"). For unrecognized
/// error kinds, falls back to including the OS-level error message
/// directly (e.g., "I/O error: read-only filesystem").
pub(crate) fn io_error_kind_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "I/O error: not found".to_string(),
        io::ErrorKind::PermissionDenied => "I/O error: permission denied".to_string(),
        io::ErrorKind::IsADirectory => "I/O error: is a directory".to_string(),
        _ => format!("I/O error: {}", err),
    }
}

/// Domain-specific error type for swapctl.
///
/// Every variant is fatal for the current invocation. Nothing is retried
/// internally; re-running the whole pipeline is safe because each step
/// is idempotent.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SwapError {
    /// The host resolved to the unsupported strategy.
    ///
    /// `name` is the distribution, or the platform family when the
    /// distribution is unknown.
    #[error("swap module cannot be used on {name}")]
    UnsupportedPlatform {
        /// Distribution name or platform family of the host.
        name: String,
    },

    /// An external command ran but exited with a non-zero status.
    #[error("{command} command failed. rc={code}, out={stdout}, err={stderr}")]
    CommandFailed {
        /// The command that was executed (first argv element).
        command: String,
        /// Exit code, or -1 when the process was terminated by a signal.
        code: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// A size string did not match `<number>[k|m|g]`.
    #[error("malformed size: {0:?}")]
    MalformedSize(String),

    /// A validation constraint was violated.
    #[error("validation error: {0}")]
    Validation(String),

    /// The command could not be located in PATH.
    #[error("command not found in PATH: {command}")]
    CommandNotFound {
        /// The command that was looked up.
        command: String,
    },

    /// A command could not be run at all (spawn failure, wait failure, thread panic).
    #[error("command execution failed: {command}: {status}")]
    Execution {
        /// The command that was executed.
        command: String,
        /// Human-readable reason for the failure.
        status: String,
    },

    /// An I/O operation failed with contextual information.
    #[error("{context}: {message}")]
    Io {
        /// What was being done when the error occurred, usually including the path.
        context: String,
        /// Human-readable description derived from [`io_error_kind_message`].
        message: String,
        /// The underlying I/O error, preserved for programmatic inspection.
        #[source]
        source: std::io::Error,
    },
}

impl SwapError {
    /// Creates an `Io` variant with the `message` field automatically derived
    /// from the `source` via [`io_error_kind_message`].
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: io_error_kind_message(&source),
            source,
        }
    }
}
