//! Orphan sweep: uploads sitting in the managed album that no catalog
//! record links to.

use lenslink_catalog::Catalog;
use lenslink_remote::RemoteService;

use crate::plan::{PlanSkip, RepairAction};
use crate::RepairError;

#[derive(Debug, Clone)]
pub struct OrphanPlan {
    pub actions: Vec<RepairAction>,
    /// Orphans with engagement above the threshold. Left in place and
    /// reported; someone is looking at them.
    pub spared: Vec<String>,
    /// Orphans whose engagement lookup failed. Left in place; one flaky
    /// photo must not stop the sweep of the rest.
    pub skipped: Vec<PlanSkip>,
}

/// Plan the sweep: every album photo without a catalog link is pulled into
/// quarantine unless its view count clears `max_views`.
pub fn orphan_sweep_plan(
    catalog: &Catalog,
    remote: &mut dyn RemoteService,
    album_id: &str,
    max_views: u64,
) -> Result<OrphanPlan, RepairError> {
    let linked = catalog.linked_remote_ids()?;
    let album = remote.album_photos(album_id)?;

    let mut actions = Vec::new();
    let mut spared = Vec::new();
    let mut skipped = Vec::new();
    for photo_id in album {
        if linked.contains(&photo_id) {
            continue;
        }
        let engagement = match remote.engagement(&photo_id) {
            Ok(e) => e,
            Err(e) => {
                skipped.push(PlanSkip {
                    photo_id,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if engagement.views >= max_views {
            spared.push(photo_id);
            continue;
        }
        actions.push(RepairAction::Quarantine {
            photo_id: photo_id.clone(),
        });
        actions.push(RepairAction::RemoveFromAlbum {
            album_id: album_id.to_string(),
            photo_id,
        });
    }
    Ok(OrphanPlan {
        actions,
        spared,
        skipped,
    })
}
