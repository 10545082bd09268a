//! src/fs/dir_scanner.rs
//!
//! # `Directory Scanner`: Inline Directory Listing
//!
//! Lists the immediate children of a directory for fork population. Runs on
//! the dispatch thread, so it never descends further than one level.

use std::{cmp::Ordering, ffi::OsStr, fs, path::Path, time::Instant};

use tracing::{debug, info};

use crate::{
    config::{ChildOrdering, ScanConfig},
    error::{CoreResult, ExplorerError},
    fs::object_info::ObjectInfo,
};

/// Scans `path` and returns its entries in the configured order.
///
/// Entries that vanish or cannot be stat'ed mid-scan are skipped; only a
/// failure to open or read the directory itself is an error.
pub fn scan_dir(path: &Path, config: &ScanConfig) -> CoreResult<Vec<ObjectInfo>> {
    let start_time = Instant::now();

    let read_dir = fs::read_dir(path).map_err(|e| ExplorerError::from_enumeration(path, e))?;

    let mut entries: Vec<ObjectInfo> = Vec::new();
    let mut skipped: usize = 0;

    for entry_result in read_dir {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                return Err(ExplorerError::from_enumeration(path, e));
            }
        };

        let entry_path = entry.path();

        if !config.show_hidden && is_hidden(&entry_path) {
            continue;
        }

        match entry.metadata() {
            Ok(meta) => entries.push(ObjectInfo::from_meta(&entry_path, &meta)),

            Err(e) => {
                // Log the error but continue processing other entries
                debug!("Skipping {:?}: {}", entry_path, e);
                skipped += 1;
            }
        }
    }

    sort_entries(&mut entries, config.ordering);

    info!(
        marker = "DIRECTORY_SCAN",
        path = %path.display(),
        entries = entries.len(),
        skipped,
        "Directory scan completed in {:?}",
        start_time.elapsed()
    );

    Ok(entries)
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name: &str| -> bool { name.starts_with('.') })
}

/// Sort entries by `ordering`; byte-wise name breaks case-insensitive ties
/// so the result is total and deterministic.
pub fn sort_entries(entries: &mut [ObjectInfo], ordering: ChildOrdering) {
    entries.sort_by(|a: &ObjectInfo, b: &ObjectInfo| -> Ordering {
        let group = match ordering {
            ChildOrdering::DirsFirst => b.is_dir.cmp(&a.is_dir),
            ChildOrdering::Lexical => Ordering::Equal,
        };

        group
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}
