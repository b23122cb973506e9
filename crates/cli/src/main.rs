// lenslink CLI - catalog/photo-host reconciliation

mod account;
mod audit;
mod config;
mod exit_codes;
mod repair_cmds;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "lenslink")]
#[command(about = "Reconcile a photo catalog with its hosting service")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/lenslink/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every published record against the remote inventory
    /// (exit 0 = reconciled, exit 3 = drift found)
    #[command(after_help = "\
Examples:
  lenslink audit
  lenslink audit --deep --refresh
  lenslink audit --output report.json
  lenslink audit --json | jq '.summary'")]
    Audit {
        /// Also decode embedded metadata (slower; enables the document-id tier)
        #[arg(long)]
        deep: bool,

        /// Audit every catalog record, not just the published album
        #[arg(long)]
        full: bool,

        /// Refetch the remote inventory instead of using the cache
        #[arg(long)]
        refresh: bool,

        /// Output the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Inventory cache file (overrides the configured path)
        #[arg(long)]
        cache: Option<PathBuf>,
    },

    /// Turn an audit report into copy-pasteable repair commands
    #[command(after_help = "\
Examples:
  lenslink plan report.json
  lenslink plan report.json > fixes.sh
  lenslink plan report.json --flag-duplicates --force")]
    Plan {
        /// Audit report from `lenslink audit --output`
        report: PathBuf,

        /// Gather multi-candidate groups into the duplicates album for review
        #[arg(long)]
        flag_duplicates: bool,

        /// Apply the album additions (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Merge two uploads of the same photo: keep one, retire the other
    #[command(after_help = "\
Examples:
  lenslink merge --keeper 111 --goner 222
  lenslink merge --keeper 111 --goner 222 --force
  lenslink merge --keeper 111 --goner 222 --missing --force
  lenslink merge --keeper 111 --goner 222 --delete --force")]
    Merge {
        /// Remote id of the upload that survives
        #[arg(long)]
        keeper: String,

        /// Remote id the catalog currently links to
        #[arg(long)]
        goner: String,

        /// The goner was already deleted on the host; only repair the catalog
        #[arg(long)]
        missing: bool,

        /// Delete the goner instead of quarantining it (engagement-guarded)
        #[arg(long)]
        delete: bool,

        /// Apply the plan (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Exchange the remote links of two catalog records
    #[command(after_help = "\
Examples:
  lenslink swap 111 222
  lenslink swap 111 222 --force")]
    Swap {
        /// First remote id
        first: String,

        /// Second remote id
        second: String,

        /// Apply the swap (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Rewrite an upload's title on the host
    #[command(after_help = "\
Examples:
  lenslink retitle 111 --title 'Dunes at dawn' --force
  lenslink retitle 111 --title '' --force    (clear the title)")]
    Retitle {
        /// Remote id of the upload
        photo_id: String,

        /// New title; empty clears it
        #[arg(long)]
        title: String,

        /// Apply the change (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Delete low-engagement duplicates from an audit report
    #[command(after_help = "\
A duplicate is deleted only when its views are under the threshold, it has
no comments, and a live favorites check comes back zero. At least one copy
of every group always survives.

Examples:
  lenslink prune report.json
  lenslink prune report.json --max-views 50 --force")]
    Prune {
        /// Audit report from `lenslink audit --output`
        report: PathBuf,

        /// Views at or above this count protect an upload
        #[arg(long, default_value = "100")]
        max_views: u64,

        /// Apply the deletions (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Quarantine album photos that no catalog record links to
    #[command(after_help = "\
Examples:
  lenslink orphans
  lenslink orphans --max-views 50 --force")]
    Orphans {
        /// Views at or above this count spare an orphan
        #[arg(long, default_value = "100")]
        max_views: u64,

        /// Apply the sweep (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Add catalog-linked photos missing from the managed album
    #[command(after_help = "\
Examples:
  lenslink sync
  lenslink sync --force")]
    Sync {
        /// Apply the additions (default is a dry run)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Store an API token for the photo host
    Login {
        /// API token (falls back to a prompt)
        #[arg(long, env = "LENSLINK_API_TOKEN")]
        token: Option<String>,

        /// API base URL
        #[arg(long, default_value = "https://api.photos.example.com")]
        api_base: String,
    },

    /// Delete the saved API token
    Logout,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone();

    let result = match cli.command {
        Commands::Audit {
            deep,
            full,
            refresh,
            json,
            output,
            cache,
        } => config::load_config(config_path.as_deref())
            .and_then(|c| audit::cmd_audit(&c, deep, full, refresh, json, output, cache)),
        Commands::Plan {
            report,
            flag_duplicates,
            force,
            yes,
        } => {
            if flag_duplicates {
                config::load_config(config_path.as_deref())
                    .and_then(|c| audit::cmd_plan(Some(&c), report, true, force, yes))
            } else {
                audit::cmd_plan(None, report, false, force, yes)
            }
        }
        Commands::Merge {
            keeper,
            goner,
            missing,
            delete,
            force,
            yes,
        } => config::load_config(config_path.as_deref()).and_then(|c| {
            repair_cmds::cmd_merge(&c, keeper, goner, missing, delete, force, yes)
        }),
        Commands::Swap {
            first,
            second,
            force,
            yes,
        } => config::load_config(config_path.as_deref())
            .and_then(|c| repair_cmds::cmd_swap(&c, first, second, force, yes)),
        Commands::Retitle {
            photo_id,
            title,
            force,
            yes,
        } => config::load_config(config_path.as_deref())
            .and_then(|c| repair_cmds::cmd_retitle(&c, photo_id, title, force, yes)),
        Commands::Prune {
            report,
            max_views,
            force,
            yes,
        } => config::load_config(config_path.as_deref())
            .and_then(|c| repair_cmds::cmd_prune(&c, report, max_views, force, yes)),
        Commands::Orphans {
            max_views,
            force,
            yes,
        } => config::load_config(config_path.as_deref())
            .and_then(|c| repair_cmds::cmd_orphans(&c, max_views, force, yes)),
        Commands::Sync { force, yes } => config::load_config(config_path.as_deref())
            .and_then(|c| repair_cmds::cmd_sync(&c, force, yes)),
        Commands::Login { token, api_base } => account::cmd_login(token, api_base),
        Commands::Logout => account::cmd_logout(),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
