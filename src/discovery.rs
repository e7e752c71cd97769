use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::engine::has_source_extension;
use crate::errors::{unspanned, EmoError, ErrorKind, ErrorReporting, PhaseContext, SourceContext};

/// Recursively scans `root` for `.emo` files.
///
/// The returned list is sorted to ensure deterministic execution order.
pub fn discover_sources<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, EmoError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            PhaseContext::new(SourceContext::fallback(&root.display().to_string()), "io").report(
                ErrorKind::ReadFailure {
                    path: root.display().to_string(),
                    reason: format!("failed to walk directory: {e}"),
                },
                unspanned(),
            )
        })?;

        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }

        files.push(entry.path().to_path_buf());
    }
    files.sort();
    Ok(files)
}
