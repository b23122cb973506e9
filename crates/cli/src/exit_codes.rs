//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | audit            | Reconciliation audit codes               |
//! | 10-19   | catalog          | Catalog file codes                       |
//! | 20-29   | remote           | Photo host API codes                     |
//! | 30-39   | repair           | State-repair codes                       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use lenslink_remote::RemoteError;
use lenslink_repair::RepairError;

use crate::CliError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Audit (3-9)
// =============================================================================

/// Audit found drift (stale links or records needing attention).
/// Like `diff(1)`, exit 0 means "fully reconciled."
pub const EXIT_AUDIT_DRIFT: u8 = 3;

/// Audit report file is malformed or from an incompatible run.
pub const EXIT_AUDIT_REPORT: u8 = 4;

// =============================================================================
// Catalog (10-19)
// =============================================================================

/// Cannot open the catalog file (missing, locked by the desktop app).
pub const EXIT_CATALOG_OPEN: u8 = 10;

/// Catalog query or write failed.
pub const EXIT_CATALOG_SQL: u8 = 11;

// =============================================================================
// Remote (20-29)
// =============================================================================

/// Not authenticated to the photo host (no saved token).
pub const EXIT_REMOTE_NOT_AUTH: u8 = 20;

/// Network/HTTP error communicating with the photo host.
pub const EXIT_REMOTE_NETWORK: u8 = 21;

/// Host returned a validation error (bad request, unprocessable entity).
pub const EXIT_REMOTE_VALIDATION: u8 = 22;

// =============================================================================
// Repair (30-39)
// =============================================================================

/// An operation's precondition does not hold; nothing was changed.
pub const EXIT_REPAIR_PRECONDITION: u8 = 30;

/// Execution stopped partway; earlier steps remain applied.
pub const EXIT_REPAIR_PARTIAL: u8 = 31;

/// Destructive run declined at the confirmation prompt.
pub const EXIT_REPAIR_DECLINED: u8 = 32;

// =============================================================================
// Error mapping
// =============================================================================

pub fn remote_error(err: RemoteError) -> CliError {
    let code = match &err {
        RemoteError::NotAuthenticated => EXIT_REMOTE_NOT_AUTH,
        RemoteError::Network(_) | RemoteError::Http(_, _) => EXIT_REMOTE_NETWORK,
        RemoteError::Validation(_) => EXIT_REMOTE_VALIDATION,
        RemoteError::Parse(_) | RemoteError::Io(_) => EXIT_ERROR,
    };
    let hint = matches!(err, RemoteError::NotAuthenticated)
        .then(|| "run `lenslink login` to store an API token".to_string());
    CliError {
        code,
        message: err.to_string(),
        hint,
    }
}

pub fn repair_error(err: RepairError) -> CliError {
    let code = match &err {
        RepairError::Precondition(_) => EXIT_REPAIR_PRECONDITION,
        RepairError::Failed { .. } => EXIT_REPAIR_PARTIAL,
        RepairError::Catalog(_) => EXIT_CATALOG_SQL,
        RepairError::Remote(e) => return remote_error_ref(e, err.to_string()),
    };
    CliError {
        code,
        message: err.to_string(),
        hint: None,
    }
}

fn remote_error_ref(err: &RemoteError, message: String) -> CliError {
    let code = match err {
        RemoteError::NotAuthenticated => EXIT_REMOTE_NOT_AUTH,
        RemoteError::Network(_) | RemoteError::Http(_, _) => EXIT_REMOTE_NETWORK,
        RemoteError::Validation(_) => EXIT_REMOTE_VALIDATION,
        RemoteError::Parse(_) | RemoteError::Io(_) => EXIT_ERROR,
    };
    CliError {
        code,
        message,
        hint: None,
    }
}
