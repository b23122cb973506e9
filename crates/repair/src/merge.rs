//! Duplicate merge: keep one upload, retire the other, leave the catalog
//! pointing at the keeper.

use lenslink_catalog::Catalog;
use lenslink_remote::RemoteService;

use crate::plan::RepairAction;
use crate::RepairError;

#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Remote id of the upload that survives.
    pub keeper: String,
    /// Remote id the catalog currently links to.
    pub goner: String,
    /// The goner was already deleted on the host; skip its remote-side
    /// checks and edits and only repair the catalog.
    pub assume_goner_gone: bool,
    /// Delete the goner after repointing. Off by default; the quarantine
    /// album is the normal resting place.
    pub delete_goner: bool,
}

/// Build the merge plan. Read-only: every precondition is checked here so
/// execution starts from a verified state.
///
/// Steps, in order: quarantine the goner, pull it out of the managed album,
/// put the keeper in, repoint the catalog link, and optionally delete the
/// goner. An interrupted run is resumable — every step is idempotent except
/// the final delete, and re-running the plan converges on the same state.
pub fn merge_plan(
    catalog: &Catalog,
    remote: &mut dyn RemoteService,
    request: &MergeRequest,
) -> Result<Vec<RepairAction>, RepairError> {
    if request.keeper == request.goner {
        return Err(RepairError::Precondition(
            "keeper and goner are the same photo".into(),
        ));
    }

    if catalog.record_by_remote_id(&request.goner)?.is_none() {
        return Err(RepairError::Precondition(format!(
            "no catalog record links {}",
            request.goner
        )));
    }

    if !remote.photo_exists(&request.keeper)? {
        return Err(RepairError::Precondition(format!(
            "keeper {} does not exist on the host",
            request.keeper
        )));
    }

    if !request.assume_goner_gone && !remote.photo_exists(&request.goner)? {
        return Err(RepairError::Precondition(format!(
            "goner {} does not exist on the host (use --missing if it was already deleted)",
            request.goner
        )));
    }

    let album_id = catalog
        .managed_album_id(&request.goner)?
        .ok_or_else(|| {
            RepairError::Precondition(format!(
                "cannot derive the managed album from {}'s catalog URL",
                request.goner
            ))
        })?;

    let mut actions = Vec::new();
    if !request.assume_goner_gone {
        actions.push(RepairAction::Quarantine {
            photo_id: request.goner.clone(),
        });
        actions.push(RepairAction::RemoveFromAlbum {
            album_id: album_id.clone(),
            photo_id: request.goner.clone(),
        });
    }
    actions.push(RepairAction::AddToAlbum {
        album_id,
        photo_id: request.keeper.clone(),
    });
    actions.push(RepairAction::Repoint {
        from: request.goner.clone(),
        to: request.keeper.clone(),
    });
    if request.delete_goner && !request.assume_goner_gone {
        actions.push(RepairAction::DeletePhoto {
            photo_id: request.goner.clone(),
        });
    }
    Ok(actions)
}
