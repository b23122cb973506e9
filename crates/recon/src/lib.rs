//! `lenslink-recon` — Tiered catalog/remote reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns classified results.
//! No CLI or IO dependencies.

pub mod engine;
pub mod model;
pub mod normalize;
pub mod prune;

pub use engine::run;
pub use model::{
    AuditInput, AuditOptions, AuditReport, LocalRecord, MatchResult, MatchTier, RemoteRecord,
};
pub use prune::{FavoritesSource, PruneDecision, PruneOptions};
