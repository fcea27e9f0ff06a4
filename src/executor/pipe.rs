//! Internal utilities for capturing command output.
//!
//! This module handles reading from stdout/stderr pipes, logging each line
//! as it arrives and collecting the full text for the caller.

use std::io::{BufRead, BufReader, Read};

/// Type of output stream for logging purposes.
#[derive(Clone, Copy)]
pub(super) enum StreamType {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Extracts a human-readable message from a thread panic.
pub(super) fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    err.downcast_ref::<&str>()
        .copied()
        .or_else(|| err.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic")
}

/// Reads from a pipe until EOF, logging each line and returning the captured text.
///
/// - stdout is logged at DEBUG level, stderr at WARN level.
/// - Binary data uses lossy UTF-8 conversion
/// - I/O errors stop reading; whatever was captured so far is returned
/// - `None` pipe logs an error and returns an empty string
pub(super) fn capture_pipe<R: Read>(pipe: Option<R>, stream_type: StreamType) -> String {
    let Some(pipe) = pipe else {
        tracing::error!(
            stream = %stream_type,
            "pipe was None (unexpected: Stdio::piped() was set), no output will be captured"
        );
        return String::new();
    };

    let mut reader = BufReader::new(pipe);
    let mut line_buf = Vec::new();
    let mut captured = String::new();

    loop {
        line_buf.clear();
        match reader.read_until(b'\n', &mut line_buf) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let text = String::from_utf8_lossy(&line_buf);
                captured.push_str(&text);
                log_line(&text, stream_type);
            }
            Err(e) => {
                tracing::error!(stream = %stream_type, error = %e, "I/O error, stopping read");
                break;
            }
        }
    }

    captured
}

/// Logs a complete line at the appropriate level.
///
/// Trailing CR/LF is trimmed to handle CRLF line endings.
fn log_line(line: &str, stream_type: StreamType) {
    let trimmed = line.trim_end_matches(['\n', '\r']);
    match stream_type {
        StreamType::Stdout => tracing::debug!(stream = %stream_type, "{}", trimmed),
        StreamType::Stderr => tracing::warn!(stream = %stream_type, "{}", trimmed),
    }
}
