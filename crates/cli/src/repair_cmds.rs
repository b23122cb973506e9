//! Repair commands: merge, swap, prune, orphans, sync.
//!
//! All of them plan first and print the plan. Nothing touches the catalog
//! or the host without --force, and --force still prompts unless --yes.

use std::path::PathBuf;

use lenslink_recon::prune::{decide, PruneOptions};
use lenslink_remote::RemoteService;
use lenslink_repair::{
    album_sync_plan, merge_plan, orphan_sweep_plan, Executor, MergeRequest, RepairAction,
};

use crate::audit::load_report;
use crate::config::AppConfig;
use crate::exit_codes::repair_error;
use crate::util::{confirm, open_catalog, print_outcomes, print_plan, remote_client, throttle};
use crate::CliError;

pub(crate) fn run_or_dry_run(
    config: &AppConfig,
    catalog: &mut lenslink_catalog::Catalog,
    remote: &mut dyn RemoteService,
    actions: &[RepairAction],
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    print_plan(actions);
    if !force {
        eprintln!("Dry run — pass --force to apply");
        return Ok(());
    }
    confirm("Apply these actions?", yes)?;
    let mut executor = Executor::new(catalog, remote, &config.quarantine_album, throttle(config));
    let outcomes = executor.run(actions).map_err(repair_error)?;
    print_outcomes(&outcomes);
    Ok(())
}

// ── Merge ───────────────────────────────────────────────────────────

pub fn cmd_merge(
    config: &AppConfig,
    keeper: String,
    goner: String,
    missing: bool,
    delete: bool,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    let mut catalog = open_catalog(config)?;
    let mut remote = remote_client()?;

    let request = MergeRequest {
        keeper,
        goner,
        assume_goner_gone: missing,
        delete_goner: delete,
    };
    let actions = merge_plan(&catalog, &mut remote, &request).map_err(repair_error)?;
    run_or_dry_run(config, &mut catalog, &mut remote, &actions, force, yes)
}

// ── Swap ────────────────────────────────────────────────────────────

pub fn cmd_swap(
    config: &AppConfig,
    first: String,
    second: String,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    let mut catalog = open_catalog(config)?;
    let mut remote = remote_client()?;

    let actions = vec![RepairAction::SwapLinks {
        a: first,
        b: second,
    }];
    run_or_dry_run(config, &mut catalog, &mut remote, &actions, force, yes)
}

// ── Retitle ─────────────────────────────────────────────────────────

pub fn cmd_retitle(
    config: &AppConfig,
    photo_id: String,
    title: String,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    let mut catalog = open_catalog(config)?;
    let mut remote = remote_client()?;

    let actions = vec![RepairAction::SetTitle { photo_id, title }];
    run_or_dry_run(config, &mut catalog, &mut remote, &actions, force, yes)
}

// ── Prune ───────────────────────────────────────────────────────────

pub fn cmd_prune(
    config: &AppConfig,
    report_path: PathBuf,
    max_views: u64,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    let report = load_report(&report_path)?;
    let mut catalog = open_catalog(config)?;
    let mut remote = remote_client()?;

    let options = PruneOptions { max_views };
    let mut actions: Vec<RepairAction> = Vec::new();
    {
        let mut favorites = |id: &str| -> Result<u64, String> {
            remote.favorites_count(id).map_err(|e| e.to_string())
        };
        for group in report.duplicate_groups() {
            let decision = decide(group, &mut favorites, &options);
            eprintln!(
                "record {} ({}): keep {:?}, delete {:?}",
                decision.local_id,
                group.local.file_name.as_deref().unwrap_or("?"),
                decision.keep,
                decision.delete
            );
            for skip in &decision.skipped {
                eprintln!("  skipped {}: {}", skip.photo_id, skip.reason);
            }
            for photo_id in decision.delete {
                actions.push(RepairAction::DeletePhoto { photo_id });
            }
        }
    }

    if actions.is_empty() {
        eprintln!("Nothing to prune");
        return Ok(());
    }
    run_or_dry_run(config, &mut catalog, &mut remote, &actions, force, yes)
}

// ── Orphans ─────────────────────────────────────────────────────────

pub fn cmd_orphans(
    config: &AppConfig,
    max_views: u64,
    force: bool,
    yes: bool,
) -> Result<(), CliError> {
    let mut catalog = open_catalog(config)?;
    let mut remote = remote_client()?;

    let plan =
        orphan_sweep_plan(&catalog, &mut remote, &config.album_id, max_views).map_err(repair_error)?;
    for photo_id in &plan.spared {
        eprintln!("spared {photo_id} (views above threshold)");
    }
    for skip in &plan.skipped {
        eprintln!("skipped {}: {}", skip.photo_id, skip.reason);
    }
    if plan.actions.is_empty() {
        eprintln!("No orphans to sweep");
        return Ok(());
    }
    run_or_dry_run(config, &mut catalog, &mut remote, &plan.actions, force, yes)
}

// ── Sync ────────────────────────────────────────────────────────────

pub fn cmd_sync(config: &AppConfig, force: bool, yes: bool) -> Result<(), CliError> {
    let mut catalog = open_catalog(config)?;
    let mut remote = remote_client()?;

    let plan = album_sync_plan(&catalog, &mut remote, &config.album_id).map_err(repair_error)?;
    for remote_id in &plan.missing {
        eprintln!("dead link {remote_id} — the linked photo no longer exists; run an audit");
    }
    for skip in &plan.skipped {
        eprintln!("skipped {}: {}", skip.photo_id, skip.reason);
    }
    if plan.actions.is_empty() {
        eprintln!("Album already matches the catalog");
        return Ok(());
    }
    run_or_dry_run(config, &mut catalog, &mut remote, &plan.actions, force, yes)
}
