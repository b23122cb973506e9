use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// A catalog-side record eligible for reconciliation.
///
/// Owned by the catalog; the engine only reads it. The repair operations may
/// rewrite `remote_id` and `url` through the catalog crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalRecord {
    pub local_id: i64,
    pub global_id: String,
    /// Authoritative remote link. Absent when the record was never published
    /// or the link was lost.
    pub remote_id: Option<String>,
    /// Service URL derived from the remote link.
    pub url: Option<String>,
    /// Base filename without extension.
    pub file_name: Option<String>,
    /// Capture timestamp as stored by the catalog (raw, not yet canonical).
    pub capture_time: Option<String>,
    /// Embedded-metadata document identifier (deep scan only).
    pub document_id: Option<String>,
}

/// A remote-side record from the hosting service, possibly from a cached
/// inventory. `favorites` is the cached count and may be stale; the pruner
/// re-fetches the live value before deciding anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: String,
    pub title: String,
    /// Capture timestamp as reported by the service (raw).
    pub taken: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub favorites: Option<u64>,
    #[serde(default)]
    pub document_id: Option<String>,
}

/// Pre-loaded records for one reconciliation run.
pub struct AuditInput {
    pub local: Vec<LocalRecord>,
    pub remote: Vec<RemoteRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Enable the document-id matching tier (requires decoded metadata on
    /// both sides).
    pub deep_scan: bool,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The tier at which a local record found its remote counterpart(s).
/// Ordered from most to least reliable; the engine stops at the first tier
/// that yields at least one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    AuthoritativeLink,
    Timestamp,
    FilenameSubstring,
    DocumentId,
    None,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthoritativeLink => write!(f, "authoritative_link"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::FilenameSubstring => write!(f, "filename_substring"),
            Self::DocumentId => write!(f, "document_id"),
            Self::None => write!(f, "none"),
        }
    }
}

/// One local record with every remote candidate found at its tier.
/// The full candidate list is kept so downstream repair logic can decide
/// among duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub local: LocalRecord,
    pub tier: MatchTier,
    pub candidates: Vec<RemoteRecord>,
    /// True when the record carried a remote link that no longer exists in
    /// the inventory (the link is stale, not merely absent).
    #[serde(default)]
    pub stale_link: bool,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_local: usize,
    pub total_remote: usize,
    pub stale_links: usize,
    pub tier_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditMeta {
    pub engine_version: String,
    pub run_at: String,
    pub deep_scan: bool,
}

/// Persisted run artifact. Round-trips through JSON losslessly so a later
/// `plan` invocation can regenerate repair commands from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub meta: AuditMeta,
    pub summary: AuditSummary,
    pub groups: Vec<MatchResult>,
}

impl AuditReport {
    /// Groups matched at a fallback tier with two or more candidates —
    /// the duplicate-upload groups the pruner operates on.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &MatchResult> {
        self.groups.iter().filter(|g| {
            g.candidates.len() >= 2
                && !matches!(g.tier, MatchTier::AuthoritativeLink | MatchTier::None)
        })
    }
}
