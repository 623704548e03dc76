use crate::error::{TomoError, TomoResult};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes an encoded notebook to a plain `.txt` file.
///
/// Trailing whitespace is dropped. The write is atomic (tempfile + rename),
/// so an existing export is never left half-written.
pub fn export_text(path: &Path, encoded: &str) -> TomoResult<()> {
    write_atomic(path, encoded.trim_end().as_bytes())
}

/// Reads a notebook previously written by [`export_text`] (or any UTF-8 text).
pub fn import_text(path: &Path) -> TomoResult<String> {
    Ok(fs::read_to_string(path)?)
}

/// Writes `data` to a temporary file next to `path` and renames it in place.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> TomoResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => return Err(TomoError::InvalidPath),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| TomoError::Io(e.error))?;
    Ok(())
}
