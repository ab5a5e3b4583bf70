//! CSV source discovery in a data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory, sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Maps display names (capitalized file stems) to CSV paths.
///
/// The display name is what users select and what artifacts are keyed by.
pub fn source_map(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut mapping = BTreeMap::new();
    for path in list_csv_files(dir)? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        mapping.insert(display_name(stem), path);
    }
    debug!(dir = %dir.display(), sources = mapping.len(), "discovered file sources");
    Ok(mapping)
}

/// Resolve a user-selected source name against the directory mapping,
/// returning the canonical display name with the path.
pub fn resolve_source(dir: &Path, name: &str) -> Result<(String, PathBuf)> {
    let mapping = source_map(dir)?;
    for (display, path) in &mapping {
        if display == name || display.eq_ignore_ascii_case(name) {
            return Ok((display.clone(), path.clone()));
        }
    }
    Err(IngestError::UnknownSource {
        name: name.to_string(),
        available: mapping.into_keys().collect(),
    })
}

fn display_name(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
