//! File helpers for the swap pipeline: permission changes, line-prefix
//! scans over host tables, and fstab appends.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use camino::Utf8Path;

use crate::error::SwapError;

/// Mode applied to a freshly allocated swap file.
pub(crate) const SWAPFILE_MODE: u32 = 0o600;

/// Sets Unix file permissions on the given path.
pub(crate) fn set_file_mode(path: &Utf8Path, mode: u32) -> Result<(), SwapError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| SwapError::io(format!("failed to set permissions on {}", path), e))
}

/// Returns true if any line of `contents` starts with `prefix`.
pub(crate) fn any_line_starts_with(contents: &str, prefix: &str) -> bool {
    contents.lines().any(|line| line.starts_with(prefix))
}

/// Scans a table file for a line starting with `prefix`.
///
/// With `missing_ok`, a missing file counts as an empty table.
pub(crate) fn table_has_entry(
    table: &Utf8Path,
    prefix: &str,
    missing_ok: bool,
) -> Result<bool, SwapError> {
    match fs::read_to_string(table) {
        Ok(contents) => Ok(any_line_starts_with(&contents, prefix)),
        Err(e) if missing_ok && e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SwapError::io(format!("failed to read {}", table), e)),
    }
}

/// The fstab line registering `filepath` as swap.
pub(crate) fn fstab_entry(filepath: &Utf8Path) -> String {
    format!("{} swap swap defaults 0 0\n", filepath)
}

/// Appends the swap entry for `filepath` to the fstab, creating the file if needed.
///
/// Existing entries are never rewritten. If the table does not end with a
/// newline, one is written first so the new entry starts on its own line.
pub(crate) fn append_fstab_entry(fstab: &Utf8Path, filepath: &Utf8Path) -> Result<(), SwapError> {
    let needs_separator = match fs::read(fstab) {
        Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(SwapError::io(format!("failed to read {}", fstab), e)),
    };

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(fstab)
        .map_err(|e| SwapError::io(format!("failed to open {} for append", fstab), e))?;

    let mut entry = String::new();
    if needs_separator {
        entry.push('\n');
    }
    entry.push_str(&fstab_entry(filepath));

    file.write_all(entry.as_bytes())
        .map_err(|e| SwapError::io(format!("failed to append to {}", fstab), e))
}
