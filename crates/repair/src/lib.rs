//! State-repair operations over the catalog and the photo host together.
//!
//! Every operation here is split into a pure planning step that emits
//! [`RepairAction`]s and an executing step that applies them. Callers show
//! the plan, collect confirmation, then execute; nothing in this crate
//! prompts or prints.

pub mod exec;
pub mod merge;
pub mod orphans;
pub mod plan;
pub mod sync;

pub use exec::{ActionOutcome, ActionStatus, Executor};
pub use merge::{merge_plan, MergeRequest};
pub use orphans::orphan_sweep_plan;
pub use plan::{PlanSkip, RepairAction};
pub use sync::{album_sync_plan, SyncPlan};

use lenslink_catalog::CatalogError;
use lenslink_remote::RemoteError;

#[derive(Debug)]
pub enum RepairError {
    /// An operation's precondition does not hold; nothing was changed.
    Precondition(String),
    Catalog(CatalogError),
    Remote(RemoteError),
    /// Execution stopped partway. Actions before `completed` are applied
    /// and stay applied; there is no rollback across two systems.
    Failed {
        action: String,
        completed: usize,
        error: String,
    },
}

impl std::fmt::Display for RepairError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Precondition(msg) => write!(f, "precondition failed: {msg}"),
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Remote(e) => write!(f, "{e}"),
            Self::Failed {
                action,
                completed,
                error,
            } => write!(
                f,
                "failed at step {} ({action}): {error}; earlier steps remain applied",
                completed + 1
            ),
        }
    }
}

impl std::error::Error for RepairError {}

impl From<CatalogError> for RepairError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<RemoteError> for RepairError {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}
