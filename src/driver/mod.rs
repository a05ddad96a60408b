pub mod chrome;
pub mod types;

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

pub use types::{DriverDiag, UploadOutcome};

/// The contract the orchestrator has with the remote form: open the add
/// dialog, stage a candidate, commit it, watch for the outcome, dismiss
/// whatever is left. Implementations own all UI/network detail; the
/// orchestrator only sequences these calls.
pub trait FormDriver {
    /// Bring up the add dialog. Fails if the add control is unavailable.
    async fn open_add_dialog(&mut self) -> Result<()>;

    /// Select the file and type the proposed name. Does not commit.
    async fn submit(&mut self, file: &Path, proposed_name: &str) -> Result<()>;

    /// Commit the staged candidate (the save-equivalent action).
    async fn save(&mut self) -> Result<()>;

    /// Race the dialog's signals, first one wins: dialog dismissed -> `Done`,
    /// duplicate preview -> `DuplicateDetected`, inline error -> `ErrorShown`,
    /// nothing within `timeout` -> `TimedOut`. Losing waits are abandoned.
    async fn await_outcome(&mut self, timeout: Duration) -> Result<UploadOutcome>;

    /// Best-effort dismissal. Callers report a failure here but never let it
    /// escalate; closing is cleanup, not part of the result.
    async fn close_dialog(&mut self) -> Result<()>;
}
