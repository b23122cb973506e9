//! End-to-end engine + pruner flow over a small drifted collection.

use lenslink_recon::model::{AuditInput, AuditOptions, LocalRecord, MatchTier, RemoteRecord};
use lenslink_recon::prune::{decide, PruneOptions};

fn local(id: i64, remote_id: Option<&str>, name: &str, taken: &str) -> LocalRecord {
    LocalRecord {
        local_id: id,
        global_id: format!("g-{id}"),
        remote_id: remote_id.map(String::from),
        url: None,
        file_name: (!name.is_empty()).then(|| name.to_string()),
        capture_time: (!taken.is_empty()).then(|| taken.to_string()),
        document_id: None,
    }
}

fn remote(id: &str, title: &str, taken: &str, views: u64) -> RemoteRecord {
    RemoteRecord {
        id: id.into(),
        title: title.into(),
        taken: (!taken.is_empty()).then(|| taken.to_string()),
        views,
        comments: 0,
        favorites: None,
        document_id: None,
    }
}

#[test]
fn audit_then_prune_a_duplicate_group() {
    // One healthy link, one record whose link is stale and whose capture
    // time matches three duplicate uploads, one hopeless record.
    let input = AuditInput {
        local: vec![
            local(1, Some("r-ok"), "IMG_0001", "2014-04-13 13:33:40"),
            local(2, Some("r-dead"), "IMG_0002", "2016-07-01 10:00:00"),
            local(3, None, "", ""),
        ],
        remote: vec![
            remote("r-ok", "keeper", "2014-04-13 13:33:40", 10),
            remote("d1", "dup", "2016-07-01 10:00:00", 50),
            remote("d2", "dup", "2016-07-01 10:00:00", 20),
            remote("d3", "dup", "2016-07-01 10:00:00", 200),
        ],
    };

    let report = lenslink_recon::run(&AuditOptions::default(), &input);
    assert_eq!(report.summary.total_local, 3);
    assert_eq!(report.summary.stale_links, 1);
    assert_eq!(report.summary.tier_counts["authoritative_link"], 1);
    assert_eq!(report.summary.tier_counts["timestamp"], 1);
    assert_eq!(report.summary.tier_counts["none"], 1);

    // The report round-trips losslessly.
    let json = serde_json::to_string(&report).unwrap();
    let reloaded: lenslink_recon::AuditReport = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded.groups.len(), report.groups.len());

    let duplicates: Vec<_> = reloaded.duplicate_groups().collect();
    assert_eq!(duplicates.len(), 1);
    let group = duplicates[0];
    assert_eq!(group.tier, MatchTier::Timestamp);
    assert_eq!(group.candidates.len(), 3);

    // Views [50, 20, 200], zero favorites everywhere: the 200-view upload
    // clears the threshold, the other two are flagged for deletion.
    let mut no_favorites = |_: &str| -> Result<u64, String> { Ok(0) };
    let decision = decide(group, &mut no_favorites, &PruneOptions::default());
    assert_eq!(decision.delete, vec!["d1", "d2"]);
    assert_eq!(decision.keep, vec!["d3"]);
    assert!(decision.delete.len() < group.candidates.len());
}
