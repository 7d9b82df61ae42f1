//! Helper functions for map persistence.

use std::path::{Path, PathBuf};

use crate::constants::MAP_FILE_EXTENSION;

/// Returns `path` with the map extension appended unless it already has it.
///
/// The extension is appended rather than substituted, so `level.v2` becomes
/// `level.v2.tmf`.
pub fn with_map_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MAP_FILE_EXTENSION));

    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(MAP_FILE_EXTENSION);
        PathBuf::from(name)
    }
}

/// Display name for a map file: its stem, or `"map"` when there is none.
pub fn map_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("map")
        .to_string()
}

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_directory(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Sibling path a map is staged at before it replaces `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes `contents` to `path` through a staging file and a rename, so a
/// failed write never truncates an existing map.
pub fn write_replacing(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let staging = staging_path(path);
    if let Err(e) = std::fs::write(&staging, contents) {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }
    std::fs::rename(&staging, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&staging);
    })
}
