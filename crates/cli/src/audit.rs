//! `lenslink audit` and `lenslink plan` — detect drift and suggest repairs.

use std::path::{Path, PathBuf};

use lenslink_recon::{AuditInput, AuditOptions, AuditReport, MatchTier};
use lenslink_remote::inventory;

use crate::config::AppConfig;
use crate::exit_codes::{
    remote_error, EXIT_AUDIT_DRIFT, EXIT_AUDIT_REPORT, EXIT_CATALOG_SQL, EXIT_ERROR,
};
use crate::CliError;

pub fn cmd_audit(
    config: &AppConfig,
    deep: bool,
    full: bool,
    refresh: bool,
    json: bool,
    output: Option<PathBuf>,
    cache: Option<PathBuf>,
) -> Result<(), CliError> {
    let catalog = crate::util::open_catalog(config)?;
    let local = if full {
        catalog.all_records(deep)
    } else {
        catalog.published_records(&config.album_id, deep)
    }
    .map_err(|e| CliError {
        code: EXIT_CATALOG_SQL,
        message: e.to_string(),
        hint: None,
    })?;

    let mut client = crate::util::remote_client()?;
    let cache = cache.unwrap_or_else(|| config.cache_path());
    let remote = if refresh {
        inventory::refresh(&mut client, &cache)
    } else {
        inventory::load_or_fetch(&mut client, &cache)
    }
    .map_err(remote_error)?;

    let report = lenslink_recon::run(
        &AuditOptions { deep_scan: deep },
        &AuditInput { local, remote },
    );

    // Human summary always goes to stderr so stdout stays pipeable.
    eprintln!(
        "Audited {} catalog records against {} uploads",
        report.summary.total_local, report.summary.total_remote
    );
    for tier in [
        MatchTier::AuthoritativeLink,
        MatchTier::Timestamp,
        MatchTier::FilenameSubstring,
        MatchTier::DocumentId,
        MatchTier::None,
    ] {
        let count = report
            .summary
            .tier_counts
            .get(&tier.to_string())
            .copied()
            .unwrap_or(0);
        if count > 0 {
            eprintln!("  {tier}: {count}");
        }
    }
    if report.summary.stale_links > 0 {
        eprintln!("  stale links: {}", report.summary.stale_links);
    }

    if let Some(ref path) = output {
        write_report(&report, path)?;
        eprintln!("Report written to {}", path.display());
    }
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| CliError {
                    code: EXIT_ERROR,
                    message: e.to_string(),
                    hint: None
                })?
        );
    }

    let drifted = report
        .groups
        .iter()
        .filter(|g| g.tier != MatchTier::AuthoritativeLink)
        .count();
    if drifted > 0 {
        eprintln!("{drifted} records need attention");
        // diff(1) semantics: nonzero exit, nothing more to say.
        return Err(CliError {
            code: EXIT_AUDIT_DRIFT,
            message: String::new(),
            hint: None,
        });
    }
    eprintln!("Fully reconciled");
    Ok(())
}

fn write_report(report: &AuditReport, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: e.to_string(),
        hint: None,
    })?;
    std::fs::write(path, json).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("cannot write report {}: {e}", path.display()),
        hint: None,
    })
}

pub fn load_report(path: &Path) -> Result<AuditReport, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_AUDIT_REPORT,
        message: format!("cannot read report {}: {e}", path.display()),
        hint: Some("generate one with `lenslink audit --output report.json`".into()),
    })?;
    serde_json::from_str(&contents).map_err(|e| CliError {
        code: EXIT_AUDIT_REPORT,
        message: format!("malformed report {}: {e}", path.display()),
        hint: None,
    })
}

/// Turn an audit report into copy-pasteable repair commands. With
/// `flag_duplicates`, also gather multi-candidate groups into the
/// duplicates album for manual review.
pub fn cmd_plan(
    config: Option<&AppConfig>,
    report_path: PathBuf,
    flag_duplicates: bool,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    let report = load_report(&report_path)?;

    let mut suggestions = 0usize;
    let mut duplicates = 0usize;
    for group in &report.groups {
        if group.tier == MatchTier::AuthoritativeLink || group.candidates.is_empty() {
            continue;
        }
        // Highest views wins ties for the keeper slot.
        let keeper = group
            .candidates
            .iter()
            .max_by_key(|c| c.views)
            .map(|c| c.id.as_str())
            .unwrap_or_default();

        match group.local.remote_id.as_deref() {
            Some(goner) => {
                println!(
                    "# record {} ({}): {} candidate(s) via {}",
                    group.local.local_id,
                    group.local.file_name.as_deref().unwrap_or("?"),
                    group.candidates.len(),
                    group.tier
                );
                // The stored link missed the inventory, so the goner is
                // already gone from the host.
                println!("lenslink merge --keeper {keeper} --goner {goner} --missing");
                suggestions += 1;
            }
            None => {
                println!(
                    "# record {} ({}): matched {} via {} but has no stored link; relink in the catalog",
                    group.local.local_id,
                    group.local.file_name.as_deref().unwrap_or("?"),
                    keeper,
                    group.tier
                );
            }
        }
        if group.candidates.len() >= 2 {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        println!("# {duplicates} duplicate group(s) — run `lenslink prune {}` to retire low-engagement copies", report_path.display());
    }
    eprintln!(
        "{suggestions} merge command(s) suggested from {} groups",
        report.groups.len()
    );

    if flag_duplicates && duplicates > 0 {
        // Presence of the config is enforced by the dispatcher.
        if let Some(config) = config {
            flag_duplicate_groups(config, &report, force, yes)?;
        }
    }
    Ok(())
}

/// Add every candidate of every multi-candidate group to the duplicates
/// album so they can be compared side by side on the host.
fn flag_duplicate_groups(
    config: &AppConfig,
    report: &AuditReport,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    use lenslink_remote::RemoteService;
    use lenslink_repair::RepairAction;

    let mut catalog = crate::util::open_catalog(config)?;
    let mut remote = crate::util::remote_client()?;

    let candidates: Vec<String> = report
        .duplicate_groups()
        .flat_map(|g| g.candidates.iter().map(|c| c.id.clone()))
        .collect();
    let Some(first) = candidates.first().cloned() else {
        return Ok(());
    };

    let existing = remote
        .albums()
        .map_err(crate::exit_codes::remote_error)?
        .into_iter()
        .find(|a| a.title == config.duplicates_album)
        .map(|a| a.id);
    let album_id = match existing {
        Some(id) => id,
        None if force => remote
            .create_album(&config.duplicates_album, &first)
            .map_err(crate::exit_codes::remote_error)?,
        None => {
            eprintln!(
                "would create album {:?} (dry run)",
                config.duplicates_album
            );
            config.duplicates_album.clone()
        }
    };

    let actions: Vec<RepairAction> = candidates
        .into_iter()
        .map(|photo_id| RepairAction::AddToAlbum {
            album_id: album_id.clone(),
            photo_id,
        })
        .collect();
    crate::repair_cmds::run_or_dry_run(config, &mut catalog, &mut remote, &actions, force, yes)
}
