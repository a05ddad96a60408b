use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A file system entry considered for upload. The path string doubles as the
/// item's key in the progress log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub path: PathBuf,
}

impl CandidateItem {
    pub fn key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Flat, deterministically ordered listing of every file under `dir`.
/// Non-image files are kept so the classifier can report each skip.
pub fn scan_directory(dir: &Path) -> Result<Vec<CandidateItem>> {
    if !dir.is_dir() {
        return Err(anyhow!("not a directory: {}", dir.display()));
    }

    let mut items = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        items.push(CandidateItem {
            path: path.to_path_buf(),
        });
    }

    debug!("scanned {} files under {}", items.len(), dir.display());
    Ok(items)
}
