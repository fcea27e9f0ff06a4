//! Swap size handling.
//!
//! Sizes are passed around as the human-readable strings the user typed
//! (`"1G"`, `"512000k"`). The extent-based allocator hands them to
//! `fallocate` verbatim; the zero-fill allocator needs a byte count and
//! parses them with [`parse_size`].

use std::fs;
use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;

use crate::error::SwapError;

/// Block size used for zero-fill allocation.
pub const BLOCK_SIZE: u64 = 1024 * 1024;

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?|\.[0-9]+)([kKmMgG]?)$").expect("size pattern is valid")
});

/// Parses `<number>[k|m|g]` into a byte count.
///
/// Suffixes are case-insensitive binary multipliers (1024, 1024², 1024³);
/// no suffix means bytes. Fractional values are allowed and truncated to
/// whole bytes.
pub fn parse_size(input: &str) -> Result<u64, SwapError> {
    let trimmed = input.trim();
    let caps = SIZE_RE
        .captures(trimmed)
        .ok_or_else(|| SwapError::MalformedSize(input.to_string()))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| SwapError::MalformedSize(input.to_string()))?;
    let multiplier = match &caps[2] {
        "k" | "K" => 1024.0,
        "m" | "M" => 1024.0 * 1024.0,
        "g" | "G" => 1024.0 * 1024.0 * 1024.0,
        _ => 1.0,
    };

    let bytes = value * multiplier;
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        return Err(SwapError::MalformedSize(input.to_string()));
    }
    Ok(bytes as u64)
}

/// Number of [`BLOCK_SIZE`] blocks that fit in `bytes`, rounded down.
pub fn block_count(bytes: u64) -> u64 {
    bytes / BLOCK_SIZE
}

/// Derives the default swap size from total physical memory.
///
/// Reads the `MemTotal:` line of a meminfo file and returns its kilobyte
/// value suffixed with `k` (e.g. `"2048000k"`).
pub fn memory_size(meminfo: &Utf8Path) -> Result<String, SwapError> {
    let contents = fs::read_to_string(meminfo)
        .map_err(|e| SwapError::io(format!("failed to read {}", meminfo), e))?;
    parse_mem_total(&contents).ok_or_else(|| {
        SwapError::Validation(format!("no MemTotal entry found in {}", meminfo))
    })
}

fn parse_mem_total(contents: &str) -> Option<String> {
    contents
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(|kb| format!("{}k", kb))
}
