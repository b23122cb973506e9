use std::collections::{HashMap, HashSet};

use crate::model::{
    AuditInput, AuditMeta, AuditOptions, AuditReport, AuditSummary, LocalRecord, MatchResult,
    MatchTier, RemoteRecord,
};
use crate::normalize::normalize_timestamp;

/// Run the tiered audit. Classifies every local record into exactly one
/// bucket; matched buckets carry the full candidate list.
pub fn run(options: &AuditOptions, input: &AuditInput) -> AuditReport {
    let indexes = RemoteIndexes::build(&input.remote, options.deep_scan);

    let mut groups: Vec<MatchResult> = Vec::with_capacity(input.local.len());
    let mut stale_links = 0usize;

    for local in &input.local {
        let result = classify(local, &indexes, input, options);
        if result.stale_link {
            stale_links += 1;
        }
        groups.push(result);
    }

    let mut tier_counts: HashMap<String, usize> = HashMap::new();
    for group in &groups {
        *tier_counts.entry(group.tier.to_string()).or_insert(0) += 1;
    }

    AuditReport {
        meta: AuditMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            deep_scan: options.deep_scan,
        },
        summary: AuditSummary {
            total_local: input.local.len(),
            total_remote: input.remote.len(),
            stale_links,
            tier_counts,
        },
        groups,
    }
}

fn classify(
    local: &LocalRecord,
    indexes: &RemoteIndexes,
    input: &AuditInput,
    options: &AuditOptions,
) -> MatchResult {
    // Tier 1: the stored remote link still exists — already reconciled.
    if let Some(ref remote_id) = local.remote_id {
        if let Some(&idx) = indexes.by_id.get(remote_id.as_str()) {
            return MatchResult {
                local: local.clone(),
                tier: MatchTier::AuthoritativeLink,
                candidates: vec![input.remote[idx].clone()],
                stale_link: false,
            };
        }
    }
    // A link that points at nothing is stale, not authoritative; the record
    // falls through to the fallback tiers.
    let stale_link = local.remote_id.is_some();

    // Tier 2: exact canonical capture-epoch equality.
    if let Some(epoch) = local.capture_time.as_deref().and_then(normalize_timestamp) {
        if let Some(hits) = indexes.by_epoch.get(&epoch) {
            return MatchResult {
                local: local.clone(),
                tier: MatchTier::Timestamp,
                candidates: collect(hits, input),
                stale_link,
            };
        }
    }

    // Tier 3: case-insensitive filename-substring-of-title. Weak signal,
    // retained because some uploads strip or rewrite metadata.
    if let Some(name) = local.file_name.as_deref().filter(|n| !n.is_empty()) {
        let needle = name.to_lowercase();
        let hits: Vec<usize> = indexes
            .titles_lower
            .iter()
            .enumerate()
            .filter(|(_, title)| title.contains(&needle))
            .map(|(i, _)| i)
            .collect();
        if !hits.is_empty() {
            return MatchResult {
                local: local.clone(),
                tier: MatchTier::FilenameSubstring,
                candidates: collect(&hits, input),
                stale_link,
            };
        }
    }

    // Tier 4: embedded document identifier (deep scan only).
    if options.deep_scan {
        if let Some(ref doc_id) = local.document_id {
            if let Some(hits) = indexes.by_document_id.get(doc_id.as_str()) {
                return MatchResult {
                    local: local.clone(),
                    tier: MatchTier::DocumentId,
                    candidates: collect(hits, input),
                    stale_link,
                };
            }
        }
    }

    // Tier 5: manual attention. Expected for records with unparseable
    // timestamps and no filename, not an error.
    MatchResult {
        local: local.clone(),
        tier: MatchTier::None,
        candidates: Vec::new(),
        stale_link,
    }
}

fn collect(indices: &[usize], input: &AuditInput) -> Vec<RemoteRecord> {
    indices.iter().map(|&i| input.remote[i].clone()).collect()
}

/// Lookup structures over the remote inventory, built once per run.
struct RemoteIndexes<'a> {
    by_id: HashMap<&'a str, usize>,
    by_epoch: HashMap<i64, Vec<usize>>,
    by_document_id: HashMap<&'a str, Vec<usize>>,
    titles_lower: Vec<String>,
}

impl<'a> RemoteIndexes<'a> {
    fn build(remote: &'a [RemoteRecord], deep_scan: bool) -> Self {
        let mut by_id = HashMap::with_capacity(remote.len());
        let mut by_epoch: HashMap<i64, Vec<usize>> = HashMap::new();
        let mut by_document_id: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut titles_lower = Vec::with_capacity(remote.len());

        let mut seen: HashSet<&str> = HashSet::with_capacity(remote.len());
        for (i, record) in remote.iter().enumerate() {
            if seen.insert(record.id.as_str()) {
                by_id.insert(record.id.as_str(), i);
            }
            if let Some(epoch) = record.taken.as_deref().and_then(normalize_timestamp) {
                by_epoch.entry(epoch).or_default().push(i);
            }
            if deep_scan {
                if let Some(ref doc_id) = record.document_id {
                    by_document_id.entry(doc_id.as_str()).or_default().push(i);
                }
            }
            titles_lower.push(record.title.to_lowercase());
        }

        Self {
            by_id,
            by_epoch,
            by_document_id,
            titles_lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(id: i64, remote_id: Option<&str>, name: &str, taken: &str) -> LocalRecord {
        LocalRecord {
            local_id: id,
            global_id: format!("g-{id}"),
            remote_id: remote_id.map(String::from),
            url: remote_id.map(|r| format!("https://photos.example.com/p/{r}/in/album-77")),
            file_name: if name.is_empty() { None } else { Some(name.into()) },
            capture_time: if taken.is_empty() { None } else { Some(taken.into()) },
            document_id: None,
        }
    }

    fn remote(id: &str, title: &str, taken: &str) -> RemoteRecord {
        RemoteRecord {
            id: id.into(),
            title: title.into(),
            taken: if taken.is_empty() { None } else { Some(taken.into()) },
            views: 0,
            comments: 0,
            favorites: None,
            document_id: None,
        }
    }

    #[test]
    fn linked_records_skip_fallback_tiers() {
        let input = AuditInput {
            local: vec![local(1, Some("r1"), "IMG_0001", "2014-04-13 13:33:40")],
            remote: vec![
                remote("r1", "anything", ""),
                remote("r2", "img_0001 copy", "2014-04-13 13:33:40"),
            ],
        };
        let report = run(&AuditOptions::default(), &input);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].tier, MatchTier::AuthoritativeLink);
        assert_eq!(report.groups[0].candidates.len(), 1);
        assert_eq!(report.groups[0].candidates[0].id, "r1");
        assert!(!report.groups[0].stale_link);
    }

    #[test]
    fn timestamp_beats_filename() {
        // Filename substring-matches remote A, timestamp exactly matches
        // remote B: the timestamp tier must win.
        let input = AuditInput {
            local: vec![local(1, None, "sunset", "2014-04-13T13:33:40")],
            remote: vec![
                remote("a", "Sunset over the bay", "2020-01-01 00:00:00"),
                remote("b", "untitled", "2014-04-13 13:33:40"),
            ],
        };
        let report = run(&AuditOptions::default(), &input);
        assert_eq!(report.groups[0].tier, MatchTier::Timestamp);
        assert_eq!(report.groups[0].candidates.len(), 1);
        assert_eq!(report.groups[0].candidates[0].id, "b");
    }

    #[test]
    fn timestamp_tier_returns_all_sharing_the_epoch() {
        let input = AuditInput {
            local: vec![local(1, None, "", "1397396020")],
            remote: vec![
                remote("a", "dup one", "2014-04-13 13:33:40"),
                remote("b", "dup two", "2014-04-13T13:33:40"),
                remote("c", "other", "2015-01-01 00:00:00"),
            ],
        };
        let report = run(&AuditOptions::default(), &input);
        assert_eq!(report.groups[0].tier, MatchTier::Timestamp);
        let ids: Vec<&str> = report.groups[0].candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn filename_match_is_case_insensitive_substring() {
        let input = AuditInput {
            local: vec![local(1, None, "IMG_4242", "")],
            remote: vec![
                remote("a", "'Trip' img_4242 edit.jpg", ""),
                remote("b", "unrelated", ""),
            ],
        };
        let report = run(&AuditOptions::default(), &input);
        assert_eq!(report.groups[0].tier, MatchTier::FilenameSubstring);
        assert_eq!(report.groups[0].candidates[0].id, "a");
    }

    #[test]
    fn document_id_tier_requires_deep_scan() {
        let mut loc = local(1, None, "", "");
        loc.document_id = Some("doc-1".into());
        let mut rem = remote("a", "x", "");
        rem.document_id = Some("doc-1".into());

        let input = AuditInput { local: vec![loc], remote: vec![rem] };

        let shallow = run(&AuditOptions { deep_scan: false }, &input);
        assert_eq!(shallow.groups[0].tier, MatchTier::None);

        let deep = run(&AuditOptions { deep_scan: true }, &input);
        assert_eq!(deep.groups[0].tier, MatchTier::DocumentId);
    }

    #[test]
    fn unmatchable_record_routes_to_none() {
        let input = AuditInput {
            local: vec![local(1, None, "", "not a timestamp")],
            remote: vec![remote("a", "x", "")],
        };
        let report = run(&AuditOptions::default(), &input);
        assert_eq!(report.groups[0].tier, MatchTier::None);
        assert!(report.groups[0].candidates.is_empty());
    }

    #[test]
    fn stale_link_falls_through_and_is_counted() {
        let input = AuditInput {
            local: vec![local(1, Some("gone"), "", "2014-04-13 13:33:40")],
            remote: vec![remote("b", "x", "2014-04-13 13:33:40")],
        };
        let report = run(&AuditOptions::default(), &input);
        assert_eq!(report.groups[0].tier, MatchTier::Timestamp);
        assert!(report.groups[0].stale_link);
        assert_eq!(report.summary.stale_links, 1);
    }
}
