//! Engagement-based pruning of duplicate-upload groups.
//!
//! Given several remote candidates matched to one local record, decide which
//! duplicates are safe to delete. Returns decisions only; a separate layer
//! confirms and executes them.

use serde::Serialize;

use crate::model::MatchResult;

/// Live favorites lookup. Counts in the cached inventory may be stale, so
/// the pruner re-fetches at decision time.
pub trait FavoritesSource {
    fn favorites_count(&mut self, photo_id: &str) -> Result<u64, String>;
}

impl<F> FavoritesSource for F
where
    F: FnMut(&str) -> Result<u64, String>,
{
    fn favorites_count(&mut self, photo_id: &str) -> Result<u64, String> {
        self(photo_id)
    }
}

#[derive(Debug, Clone)]
pub struct PruneOptions {
    /// Candidates at or above this view count are never low-engagement.
    pub max_views: u64,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self { max_views: 100 }
    }
}

/// A candidate whose live favorites lookup failed. Protected from deletion;
/// the run continues.
#[derive(Debug, Clone, Serialize)]
pub struct PruneSkip {
    pub photo_id: String,
    pub reason: String,
}

/// Which duplicates of one group may be deleted. Transient, never persisted
/// beyond the run's report.
#[derive(Debug, Clone, Serialize)]
pub struct PruneDecision {
    pub local_id: i64,
    pub remote_id: Option<String>,
    pub keep: Vec<String>,
    pub delete: Vec<String>,
    pub skipped: Vec<PruneSkip>,
}

/// Decide which candidates of a duplicate group are safe to delete.
///
/// A candidate is low-engagement iff its views are below the threshold, it
/// has no comments, and its live favorites count is zero. If every candidate
/// is low-engagement, the highest-viewed one is pulled back off the deletion
/// list — a group never loses all of its candidates. When at least one
/// candidate is not low-engagement, the deletion list is exactly the
/// low-engagement ones; the highest-viewed candidate gets no special
/// protection in that branch.
///
/// Groups with fewer than two candidates never reach the pruner.
pub fn decide(
    group: &MatchResult,
    favorites: &mut dyn FavoritesSource,
    options: &PruneOptions,
) -> PruneDecision {
    debug_assert!(group.candidates.len() >= 2);

    let mut delete: Vec<String> = Vec::new();
    let mut keep: Vec<String> = Vec::new();
    let mut skipped: Vec<PruneSkip> = Vec::new();

    let mut highest: Option<(usize, u64)> = None;

    for (i, candidate) in group.candidates.iter().enumerate() {
        match highest {
            Some((_, views)) if views >= candidate.views => {}
            _ => highest = Some((i, candidate.views)),
        }

        let live_favorites = match favorites.favorites_count(&candidate.id) {
            Ok(n) => n,
            Err(reason) => {
                skipped.push(PruneSkip {
                    photo_id: candidate.id.clone(),
                    reason,
                });
                keep.push(candidate.id.clone());
                continue;
            }
        };

        let low_engagement = candidate.views < options.max_views
            && candidate.comments == 0
            && live_favorites == 0;

        if low_engagement {
            delete.push(candidate.id.clone());
        } else {
            keep.push(candidate.id.clone());
        }
    }

    // Every candidate low-engagement: the highest-viewed one survives.
    if delete.len() == group.candidates.len() {
        if let Some((idx, _)) = highest {
            let survivor = group.candidates[idx].id.clone();
            delete.retain(|id| *id != survivor);
            keep.push(survivor);
        }
    }

    PruneDecision {
        local_id: group.local.local_id,
        remote_id: group.local.remote_id.clone(),
        keep,
        delete,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalRecord, MatchTier, RemoteRecord};

    fn candidate(id: &str, views: u64, comments: u64) -> RemoteRecord {
        RemoteRecord {
            id: id.into(),
            title: format!("photo {id}"),
            taken: None,
            views,
            comments,
            favorites: None,
            document_id: None,
        }
    }

    fn group(candidates: Vec<RemoteRecord>) -> MatchResult {
        MatchResult {
            local: LocalRecord {
                local_id: 7,
                global_id: "g-7".into(),
                remote_id: Some("old".into()),
                url: None,
                file_name: None,
                capture_time: None,
                document_id: None,
            },
            tier: MatchTier::Timestamp,
            candidates,
            stale_link: true,
        }
    }

    fn no_favorites(_: &str) -> Result<u64, String> {
        Ok(0)
    }

    #[test]
    fn mixed_engagement_deletes_only_the_low_ones() {
        // 200 views clears the threshold, so it is not low-engagement and
        // the other two are deleted with no further protection.
        let g = group(vec![
            candidate("a", 50, 0),
            candidate("b", 20, 0),
            candidate("c", 200, 0),
        ]);
        let decision = decide(&g, &mut no_favorites, &PruneOptions::default());
        assert_eq!(decision.delete, vec!["a", "b"]);
        assert_eq!(decision.keep, vec!["c"]);
    }

    #[test]
    fn all_low_engagement_keeps_the_highest_viewed() {
        let g = group(vec![
            candidate("a", 50, 0),
            candidate("b", 20, 0),
            candidate("c", 80, 0),
        ]);
        let decision = decide(&g, &mut no_favorites, &PruneOptions::default());
        assert_eq!(decision.delete, vec!["a", "b"]);
        assert_eq!(decision.keep, vec!["c"]);
    }

    #[test]
    fn never_deletes_every_candidate() {
        let g = group(vec![candidate("a", 0, 0), candidate("b", 0, 0)]);
        let decision = decide(&g, &mut no_favorites, &PruneOptions::default());
        assert!(decision.delete.len() < g.candidates.len());
        assert_eq!(decision.keep.len() + decision.delete.len(), 2);
    }

    #[test]
    fn live_favorites_protect_a_candidate() {
        let g = group(vec![candidate("a", 5, 0), candidate("b", 3, 0)]);
        let mut favorites = |id: &str| -> Result<u64, String> {
            Ok(if id == "b" { 4 } else { 0 })
        };
        let decision = decide(&g, &mut favorites, &PruneOptions::default());
        assert_eq!(decision.delete, vec!["a"]);
        assert_eq!(decision.keep, vec!["b"]);
    }

    #[test]
    fn comments_protect_a_candidate() {
        let g = group(vec![candidate("a", 5, 2), candidate("b", 3, 0)]);
        let decision = decide(&g, &mut no_favorites, &PruneOptions::default());
        assert_eq!(decision.delete, vec!["b"]);
        assert_eq!(decision.keep, vec!["a"]);
    }

    #[test]
    fn lookup_failure_protects_and_is_reported() {
        let g = group(vec![candidate("a", 5, 0), candidate("b", 3, 0)]);
        let mut favorites = |id: &str| -> Result<u64, String> {
            if id == "a" {
                Err("service unavailable".into())
            } else {
                Ok(0)
            }
        };
        let decision = decide(&g, &mut favorites, &PruneOptions::default());
        assert_eq!(decision.skipped.len(), 1);
        assert_eq!(decision.skipped[0].photo_id, "a");
        assert_eq!(decision.delete, vec!["b"]);
        assert!(decision.keep.contains(&"a".to_string()));
    }
}
