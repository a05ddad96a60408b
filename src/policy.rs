use crate::progress::{ProgressLog, ProgressTag};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Eligible,
    SkipWrongType,
    SkipAlreadyDone,
    SkipAlreadyDuplicate,
    SkipPreviouslyFailed,
    SkipEarlierTimeout,
}

impl Decision {
    pub fn label(self) -> &'static str {
        match self {
            Decision::Eligible => "eligible",
            Decision::SkipWrongType => "not an image",
            Decision::SkipAlreadyDone => "already uploaded",
            Decision::SkipAlreadyDuplicate => "duplicate of existing emoji",
            Decision::SkipPreviouslyFailed => "previously failed",
            Decision::SkipEarlierTimeout => "timed out earlier",
        }
    }
}

/// Lowercased extension when the path names an image candidate.
pub fn image_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

/// Whether an item should be driven through the upload form. Keyed on the
/// path string alone: the first log entry for the path decides the skip
/// reason by its tag. Pure and total.
pub fn decide(path: &Path, log: &ProgressLog) -> Decision {
    if image_extension(path).is_none() {
        return Decision::SkipWrongType;
    }

    let key = path.to_string_lossy();
    match log.first_for(&key).map(|e| e.tag) {
        None => Decision::Eligible,
        Some(ProgressTag::Uploaded) => Decision::SkipAlreadyDone,
        Some(ProgressTag::Duplicate) => Decision::SkipAlreadyDuplicate,
        Some(ProgressTag::Failed) => Decision::SkipPreviouslyFailed,
        Some(ProgressTag::Timeout) => Decision::SkipEarlierTimeout,
    }
}
