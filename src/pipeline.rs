use crate::{
    config::{Config, DuplicatePolicy},
    driver::{FormDriver, UploadOutcome},
    policy::{self, Decision},
    progress::{ProgressEntry, ProgressStore, ProgressTag},
    scan::CandidateItem,
    util,
};
use anyhow::{Result, anyhow};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

/// Drives each candidate through submit -> observe -> record, strictly one at
/// a time. The remote form has single-focus state, so there is never more
/// than one open dialog.
pub struct Pipeline<D: FormDriver> {
    driver: D,
    duplicate_policy: DuplicatePolicy,
    duplicate_check: Duration,
    save_timeout: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub uploaded: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub timeouts: usize,
    pub skipped: usize,
}

impl<D: FormDriver> Pipeline<D> {
    pub fn new(cfg: &Config, driver: D) -> Result<Self> {
        Ok(Self {
            driver,
            duplicate_policy: cfg.duplicates.parse_policy()?,
            duplicate_check: Duration::from_millis(cfg.timeouts.duplicate_check_ms),
            save_timeout: Duration::from_secs(cfg.timeouts.save_seconds),
        })
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// One pass over the candidate list. Every terminal outcome is appended
    /// to the store before the next item starts; per-item faults become
    /// `Failed` entries and never abort the loop.
    pub async fn run_batch(
        &mut self,
        items: &[CandidateItem],
        store: &mut ProgressStore,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary {
            total: items.len(),
            ..Default::default()
        };

        for (num, item) in items.iter().enumerate() {
            let key = item.key();

            let decision = policy::decide(&item.path, store.log());
            if decision != Decision::Eligible {
                warn!("{num} skipped ({}): {key}", decision.label());
                summary.skipped += 1;
                continue;
            }

            let tag = match self.drive_item(item).await {
                Ok(tag) => tag,
                Err(err) => {
                    warn!("{num} upload failed: {key}: {err:#}");
                    self.dismiss().await;
                    ProgressTag::Failed
                }
            };

            store.append(ProgressEntry::new(tag, key.clone()))?;
            match tag {
                ProgressTag::Uploaded => {
                    info!("{num} Uploaded: {key}");
                    summary.uploaded += 1;
                }
                ProgressTag::Duplicate => {
                    warn!("{num} Duplicate: {key}");
                    summary.duplicates += 1;
                }
                ProgressTag::Failed => {
                    warn!("{num} Failed: {key}");
                    summary.failed += 1;
                }
                ProgressTag::Timeout => {
                    warn!("{num} Timeout: {key}");
                    summary.timeouts += 1;
                }
            }
        }

        Ok(summary)
    }

    /// The per-item state machine: open -> submit -> duplicate check ->
    /// save -> outcome. Returns the terminal tag to record; the dialog is
    /// closed (or a close attempted) on every path that leaves it open.
    async fn drive_item(&mut self, item: &CandidateItem) -> Result<ProgressTag> {
        let ext = policy::image_extension(&item.path)
            .ok_or_else(|| anyhow!("not an image candidate: {}", item.path.display()))?;
        let mut name = util::emoji_name(&item.path, &ext);
        let mut renames_left = match self.duplicate_policy {
            DuplicatePolicy::Record => 0,
            DuplicatePolicy::RenameOnce => 1,
        };

        loop {
            self.driver.open_add_dialog().await?;
            self.driver.submit(&item.path, &name).await?;

            // A duplicate preview shows up quickly or not at all; timing out
            // here is the green light to save.
            match self.driver.await_outcome(self.duplicate_check).await? {
                UploadOutcome::DuplicateDetected => {
                    self.dismiss().await;
                    if renames_left > 0 {
                        renames_left -= 1;
                        name = util::renamed(&name, &ext);
                        info!("duplicate flagged; retrying once as :{name}:");
                        continue;
                    }
                    return Ok(ProgressTag::Duplicate);
                }
                UploadOutcome::ErrorShown => {
                    self.dismiss().await;
                    return Ok(ProgressTag::Failed);
                }
                UploadOutcome::Done => {
                    return Err(anyhow!("dialog dismissed before save"));
                }
                UploadOutcome::TimedOut => {}
            }

            self.driver.save().await?;

            return match self.driver.await_outcome(self.save_timeout).await? {
                UploadOutcome::Done => Ok(ProgressTag::Uploaded),
                UploadOutcome::DuplicateDetected => {
                    self.dismiss().await;
                    Ok(ProgressTag::Duplicate)
                }
                UploadOutcome::ErrorShown => {
                    self.dismiss().await;
                    Ok(ProgressTag::Failed)
                }
                UploadOutcome::TimedOut => {
                    self.dismiss().await;
                    Ok(ProgressTag::Timeout)
                }
            };
        }
    }

    /// Closing is cleanup, not part of the result: report, never escalate.
    async fn dismiss(&mut self) {
        if let Err(err) = self.driver.close_dialog().await {
            error!("failed to dismiss dialog: {err:#}");
        }
    }
}
