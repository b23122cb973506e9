//! Album sync: make the managed album's membership match the catalog's
//! linked records.

use lenslink_catalog::Catalog;
use lenslink_remote::RemoteService;

use crate::plan::{PlanSkip, RepairAction};
use crate::RepairError;

#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub actions: Vec<RepairAction>,
    /// Linked remote ids that no longer exist on the host. These are stale
    /// links for the audit to resolve, not something sync can fix.
    pub missing: Vec<String>,
    /// Linked remote ids whose existence check failed. Not added and not
    /// declared missing; the rest of the plan still goes ahead.
    pub skipped: Vec<PlanSkip>,
}

/// Plan additions for every catalog-linked photo absent from the album.
/// Photos already in the album are untouched; sync never removes.
pub fn album_sync_plan(
    catalog: &Catalog,
    remote: &mut dyn RemoteService,
    album_id: &str,
) -> Result<SyncPlan, RepairError> {
    let in_album: std::collections::HashSet<String> =
        remote.album_photos(album_id)?.into_iter().collect();

    let mut linked: Vec<String> = catalog.linked_remote_ids()?.into_iter().collect();
    linked.sort();

    let mut actions = Vec::new();
    let mut missing = Vec::new();
    let mut skipped = Vec::new();
    for remote_id in linked {
        if in_album.contains(&remote_id) {
            continue;
        }
        match remote.photo_exists(&remote_id) {
            Ok(true) => actions.push(RepairAction::AddToAlbum {
                album_id: album_id.to_string(),
                photo_id: remote_id,
            }),
            Ok(false) => missing.push(remote_id),
            Err(e) => skipped.push(PlanSkip {
                photo_id: remote_id,
                reason: e.to_string(),
            }),
        }
    }
    Ok(SyncPlan {
        actions,
        missing,
        skipped,
    })
}
