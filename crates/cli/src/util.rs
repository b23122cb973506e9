use std::io::{self, Write};
use std::time::Duration;

use lenslink_catalog::{Catalog, CatalogError};
use lenslink_remote::RemoteClient;
use lenslink_repair::{ActionOutcome, ActionStatus, RepairAction};

use crate::config::AppConfig;
use crate::exit_codes::{
    remote_error, EXIT_CATALOG_OPEN, EXIT_CATALOG_SQL, EXIT_REPAIR_DECLINED, EXIT_USAGE,
};
use crate::CliError;

pub fn open_catalog(config: &AppConfig) -> Result<Catalog, CliError> {
    Catalog::open(&config.catalog).map_err(|e| {
        let code = match e {
            CatalogError::Open(_) => EXIT_CATALOG_OPEN,
            _ => EXIT_CATALOG_SQL,
        };
        CliError {
            code,
            message: e.to_string(),
            hint: Some("close the catalog application first".into()),
        }
    })
}

pub fn remote_client() -> Result<RemoteClient, CliError> {
    RemoteClient::from_saved_auth().map_err(remote_error)
}

pub fn throttle(config: &AppConfig) -> Duration {
    Duration::from_millis(config.throttle_ms)
}

/// Show the plan the way it will run, one numbered line per action.
pub fn print_plan(actions: &[RepairAction]) {
    eprintln!("Plan ({} actions):", actions.len());
    for (i, action) in actions.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, action);
    }
}

pub fn print_outcomes(outcomes: &[ActionOutcome]) {
    for outcome in outcomes {
        let status = match &outcome.status {
            ActionStatus::Applied => "done".to_string(),
            ActionStatus::NoOp => "already done".to_string(),
            ActionStatus::Skipped(reason) => format!("SKIPPED ({reason})"),
        };
        eprintln!("  {} — {}", outcome.action, status);
    }
}

/// Interactive yes/no gate in front of every destructive batch.
/// `--yes` skips the prompt; a non-TTY stdin without `--yes` refuses.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<(), CliError> {
    if assume_yes {
        return Ok(());
    }
    if !atty::is(atty::Stream::Stdin) {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "stdin is not a TTY; cannot confirm".into(),
            hint: Some("pass --yes to skip the prompt".into()),
        });
    }
    eprint!("{prompt} [y/N] ");
    io::stderr().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).map_err(|e| CliError {
        code: crate::exit_codes::EXIT_ERROR,
        message: e.to_string(),
        hint: None,
    })?;
    let answer = buf.trim().to_lowercase();
    if answer == "y" || answer == "yes" {
        Ok(())
    } else {
        Err(CliError {
            code: EXIT_REPAIR_DECLINED,
            message: "aborted".into(),
            hint: None,
        })
    }
}
