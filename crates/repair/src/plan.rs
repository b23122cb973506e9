//! The action vocabulary shared by every repair operation.

use serde::Serialize;

/// One planned change. Catalog-side and remote-side actions mix freely in a
/// plan; the executor dispatches on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    /// Add the photo to the quarantine album. The album is resolved (and
    /// created on first use) at execution time, so planning stays read-only.
    Quarantine { photo_id: String },
    AddToAlbum { album_id: String, photo_id: String },
    RemoveFromAlbum { album_id: String, photo_id: String },
    /// Rewrite the catalog's authoritative link and derived URL.
    Repoint { from: String, to: String },
    /// Exchange the links of two catalog records.
    SwapLinks { a: String, b: String },
    /// Replace the photo's remote title. An empty title clears it.
    SetTitle { photo_id: String, title: String },
    /// Permanently delete the photo from the host. The executor re-checks
    /// engagement first and skips photos that picked up favorites or
    /// comments since planning.
    DeletePhoto { photo_id: String },
}

/// A photo the planner could not evaluate because its remote lookup
/// failed. The plan covers the rest; skipped photos are reported so the
/// operator can retry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSkip {
    pub photo_id: String,
    pub reason: String,
}

impl std::fmt::Display for RepairAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quarantine { photo_id } => write!(f, "quarantine photo {photo_id}"),
            Self::AddToAlbum { album_id, photo_id } => {
                write!(f, "add photo {photo_id} to album {album_id}")
            }
            Self::RemoveFromAlbum { album_id, photo_id } => {
                write!(f, "remove photo {photo_id} from album {album_id}")
            }
            Self::Repoint { from, to } => write!(f, "repoint catalog link {from} -> {to}"),
            Self::SwapLinks { a, b } => write!(f, "swap catalog links {a} <-> {b}"),
            Self::SetTitle { photo_id, title } => {
                write!(f, "set title of photo {photo_id} to {title:?}")
            }
            Self::DeletePhoto { photo_id } => write!(f, "delete photo {photo_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_render_for_confirmation_prompts() {
        let action = RepairAction::Repoint {
            from: "111".into(),
            to: "222".into(),
        };
        assert_eq!(action.to_string(), "repoint catalog link 111 -> 222");

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "repoint");
        assert_eq!(json["from"], "111");
    }
}
