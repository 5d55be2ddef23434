//! UpdateChecklistHandler - flips one checklist item on an undecided release.

use std::sync::Arc;

use crate::domain::foundation::{ChecklistItemId, ReleaseId, UserId};
use crate::domain::release::{Release, ReleaseError};
use crate::ports::ReleaseRepository;

#[derive(Debug, Clone)]
pub struct UpdateChecklistCommand {
    /// Release under review.
    pub release_id: ReleaseId,
    /// Checklist item to tick or untick.
    pub item_id: ChecklistItemId,
    /// New state of the item.
    pub checked: bool,
    /// Reviewer making the change.
    pub checked_by: UserId,
}

pub struct UpdateChecklistHandler {
    releases: Arc<dyn ReleaseRepository>,
}

impl UpdateChecklistHandler {
    pub fn new(releases: Arc<dyn ReleaseRepository>) -> Self {
        Self { releases }
    }

    pub async fn handle(&self, cmd: UpdateChecklistCommand) -> Result<Release, ReleaseError> {
        let mut release = self
            .releases
            .find_by_id(cmd.release_id)
            .await?
            .ok_or(ReleaseError::NotFound(cmd.release_id))?;

        release.update_checklist(cmd.item_id, cmd.checked, &cmd.checked_by)?;
        self.releases.update_pending(&release).await?;

        tracing::info!(
            release_id = %release.id(),
            item_id = %cmd.item_id,
            checked = cmd.checked,
            "checklist updated"
        );
        Ok(release)
    }
}
