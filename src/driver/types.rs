use serde::{Deserialize, Serialize};

/// Transient result of one submission attempt. Mapped to a progress tag by
/// the orchestrator, never persisted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadOutcome {
    Done,
    DuplicateDetected,
    ErrorShown,
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDiag {
    pub chrome_exe: Option<String>,
    pub headless: bool,
    pub gallery_url: Option<String>,
    pub credentials_present: bool,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
