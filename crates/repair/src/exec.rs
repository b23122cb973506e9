//! Plan execution.
//!
//! Actions run strictly in plan order and stop at the first failure. The
//! catalog and the host are two systems with no shared transaction, so a
//! mid-plan failure leaves earlier actions applied; the error says where
//! execution stopped so the operator can resume.

use std::thread;
use std::time::Duration;

use serde::Serialize;

use lenslink_catalog::Catalog;
use lenslink_remote::{AlbumChange, RemoteService};

use crate::plan::RepairAction;
use crate::RepairError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Applied,
    /// The system was already in the requested state.
    NoOp,
    /// Deliberately not applied; the plan continues.
    Skipped(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action: RepairAction,
    pub status: ActionStatus,
}

pub struct Executor<'a> {
    catalog: &'a mut Catalog,
    remote: &'a mut dyn RemoteService,
    /// Title of the quarantine album, resolved to an id on first use.
    quarantine_album: String,
    quarantine_album_id: Option<String>,
    /// Pause between remote writes. The host rate-limits bursts.
    throttle: Duration,
}

impl<'a> Executor<'a> {
    pub fn new(
        catalog: &'a mut Catalog,
        remote: &'a mut dyn RemoteService,
        quarantine_album: &str,
        throttle: Duration,
    ) -> Self {
        Self {
            catalog,
            remote,
            quarantine_album: quarantine_album.to_string(),
            quarantine_album_id: None,
            throttle,
        }
    }

    /// Apply every action in order. Returns one outcome per applied action;
    /// on failure the error carries how many actions completed.
    pub fn run(&mut self, actions: &[RepairAction]) -> Result<Vec<ActionOutcome>, RepairError> {
        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            let status = self.apply(action).map_err(|e| RepairError::Failed {
                action: action.to_string(),
                completed: outcomes.len(),
                error: e.to_string(),
            })?;
            outcomes.push(ActionOutcome {
                action: action.clone(),
                status,
            });
        }
        Ok(outcomes)
    }

    fn apply(&mut self, action: &RepairAction) -> Result<ActionStatus, RepairError> {
        match action {
            RepairAction::Quarantine { photo_id } => {
                let (album_id, created) = self.quarantine_album_id(photo_id)?;
                if created {
                    // The photo just became the new album's primary; it is
                    // already a member.
                    return Ok(ActionStatus::Applied);
                }
                let change = self.remote.add_to_album(&album_id, photo_id)?;
                self.pause();
                Ok(change.into())
            }
            RepairAction::AddToAlbum { album_id, photo_id } => {
                let change = self.remote.add_to_album(album_id, photo_id)?;
                self.pause();
                Ok(change.into())
            }
            RepairAction::RemoveFromAlbum { album_id, photo_id } => {
                let change = self.remote.remove_from_album(album_id, photo_id)?;
                self.pause();
                Ok(change.into())
            }
            RepairAction::Repoint { from, to } => {
                let touched = self.catalog.repoint(from, to)?;
                if touched == 0 {
                    return Err(RepairError::Precondition(format!(
                        "no catalog record links {from}"
                    )));
                }
                Ok(ActionStatus::Applied)
            }
            RepairAction::SwapLinks { a, b } => {
                self.catalog.swap_links(a, b)?;
                Ok(ActionStatus::Applied)
            }
            RepairAction::SetTitle { photo_id, title } => {
                self.remote.set_title(photo_id, title)?;
                self.pause();
                Ok(ActionStatus::Applied)
            }
            RepairAction::DeletePhoto { photo_id } => {
                // Engagement may have changed since planning; deletion is
                // the one action that cannot be undone, so re-check.
                let engagement = self.remote.engagement(photo_id)?;
                if engagement.favorites > 0 || engagement.comments > 0 {
                    return Ok(ActionStatus::Skipped(format!(
                        "{} favorites, {} comments",
                        engagement.favorites, engagement.comments
                    )));
                }
                self.remote.delete_photo(photo_id)?;
                self.pause();
                Ok(ActionStatus::Applied)
            }
        }
    }

    /// Resolve the quarantine album by title, creating it with this photo
    /// as primary when it does not exist yet. Returns whether creation
    /// happened, since creation already seats the primary photo.
    fn quarantine_album_id(
        &mut self,
        primary_photo: &str,
    ) -> Result<(String, bool), RepairError> {
        if let Some(ref id) = self.quarantine_album_id {
            return Ok((id.clone(), false));
        }
        let existing = self
            .remote
            .albums()?
            .into_iter()
            .find(|a| a.title == self.quarantine_album)
            .map(|a| a.id);
        let (id, created) = match existing {
            Some(id) => (id, false),
            None => {
                let id = self
                    .remote
                    .create_album(&self.quarantine_album, primary_photo)?;
                self.pause();
                (id, true)
            }
        };
        self.quarantine_album_id = Some(id.clone());
        Ok((id, created))
    }

    fn pause(&self) {
        if !self.throttle.is_zero() {
            thread::sleep(self.throttle);
        }
    }
}

impl From<AlbumChange> for ActionStatus {
    fn from(change: AlbumChange) -> Self {
        match change {
            AlbumChange::Applied => ActionStatus::Applied,
            AlbumChange::NoOp => ActionStatus::NoOp,
        }
    }
}
