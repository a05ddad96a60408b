use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Terminal classification persisted for one source file. Skips are reported
/// on the console but never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTag {
    Uploaded,
    Duplicate,
    Failed,
    Timeout,
}

impl ProgressTag {
    fn prefix(self) -> Option<&'static str> {
        match self {
            ProgressTag::Uploaded => None,
            ProgressTag::Duplicate => Some("Duplicate: "),
            ProgressTag::Failed => Some("Failed: "),
            ProgressTag::Timeout => Some("Timeout: "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub tag: ProgressTag,
    pub path: String,
}

impl ProgressEntry {
    pub fn new(tag: ProgressTag, path: impl Into<String>) -> Self {
        Self {
            tag,
            path: path.into(),
        }
    }

    /// On-disk form: bare path for success, `"<Tag>: <path>"` otherwise.
    pub fn encode(&self) -> String {
        match self.tag.prefix() {
            Some(prefix) => format!("{prefix}{}", self.path),
            None => self.path.clone(),
        }
    }

    /// Total: a string with no recognized prefix is a success entry whose
    /// path is the whole string.
    pub fn decode(raw: &str) -> Self {
        for tag in [
            ProgressTag::Duplicate,
            ProgressTag::Failed,
            ProgressTag::Timeout,
        ] {
            if let Some(prefix) = tag.prefix() {
                if let Some(path) = raw.strip_prefix(prefix) {
                    return Self::new(tag, path);
                }
            }
        }
        Self::new(ProgressTag::Uploaded, raw)
    }
}

/// Ordered record of every terminal outcome across runs. Append-only within
/// a run; insertion order is processing order.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    entries: Vec<ProgressEntry>,
}

impl ProgressLog {
    pub fn from_entries(entries: Vec<ProgressEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgressEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ProgressEntry> {
        self.entries.last()
    }

    /// First entry recorded for a path, regardless of tag. The path string is
    /// the sole key; the tag only tells the caller why the item is terminal.
    pub fn first_for(&self, path: &str) -> Option<&ProgressEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    fn push(&mut self, entry: ProgressEntry) {
        self.entries.push(entry);
    }

    fn encoded(&self) -> Vec<String> {
        self.entries.iter().map(ProgressEntry::encode).collect()
    }
}

/// Durable owner of the progress log. `append` mutates the in-memory log and
/// rewrites the whole file before returning, so a crash mid-run loses at most
/// the in-flight item.
pub struct ProgressStore {
    path: PathBuf,
    log: ProgressLog,
}

impl ProgressStore {
    pub fn load(dir: &Path, filename: &str) -> Result<Self> {
        let path = dir.join(filename);
        let log = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading progress file: {}", path.display()))?;
            let lines: Vec<String> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing progress file: {}", path.display()))?;
            info!("loaded {} progress entries from {}", lines.len(), path.display());
            ProgressLog::from_entries(lines.iter().map(|s| ProgressEntry::decode(s)).collect())
        } else {
            info!("no progress file at {}; starting fresh", path.display());
            ProgressLog::default()
        };
        Ok(Self { path, log })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self) -> &ProgressLog {
        &self.log
    }

    pub fn append(&mut self, entry: ProgressEntry) -> Result<()> {
        self.log.push(entry);
        let raw = serde_json::to_string_pretty(&self.log.encoded())?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing progress file: {}", self.path.display()))?;
        Ok(())
    }
}
