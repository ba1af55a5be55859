// crates/cli/src/commands.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use report_portal_types::UploadDecision;

#[derive(Debug, Parser)]
#[command(name = "report-portal")]
#[command(about = "Browse, upload and delete trading reports", long_about = None)]
pub struct Cli {
    /// Backend URL (default: $REPORT_PORTAL_URL or http://localhost:8000)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (default: $REPORT_PORTAL_TIMEOUT_SECS or 30)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Session file (default: $REPORT_PORTAL_SESSION or the app data dir)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and list the sites this account may open
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to $REPORT_PORTAL_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// List the sites this account may open
    Sites,
    /// Open any view by path, e.g. /admin/dashboard
    Open { path: String },
    /// List the dates that have reports for a category
    Dates { site: String, category: String },
    /// List the reports filed for a date
    Reports {
        site: String,
        category: String,
        date: String,
    },
    /// Upload a report (admin site only)
    Upload {
        site: String,
        category: String,
        date: String,
        file: PathBuf,
        /// What to do when a report already exists for the date
        #[arg(long, value_enum, default_value_t = OnConflict::Ask)]
        on_conflict: OnConflict,
    },
    /// Delete a report listed for a date
    Delete {
        site: String,
        category: String,
        date: String,
        id: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnConflict {
    Ask,
    Override,
    New,
    Cancel,
}

impl OnConflict {
    /// The decision to apply without asking, if any.
    pub fn decision(self) -> Option<UploadDecision> {
        match self {
            OnConflict::Ask => None,
            OnConflict::Override => Some(UploadDecision::Override),
            OnConflict::New => Some(UploadDecision::SaveAsNew),
            OnConflict::Cancel => Some(UploadDecision::Cancel),
        }
    }
}

/// Each argument becomes exactly one path segment, whatever it contains.
fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

pub fn dates_path(site: &str, category: &str) -> String {
    format!(
        "/{}/dashboard/reports/{}/dates",
        segment(site),
        segment(&category.to_lowercase())
    )
}

pub fn reports_path(site: &str, category: &str, date: &str) -> String {
    format!(
        "/{}/dashboard/reports/{}/{}/view",
        segment(site),
        segment(&category.to_lowercase()),
        segment(date)
    )
}

pub fn upload_path(site: &str) -> String {
    format!("/{}/dashboard/upload", segment(site))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_defaults_to_ask() {
        let cli = Cli::parse_from([
            "report-portal",
            "upload",
            "admin",
            "MACD",
            "2024-01-05",
            "macd.pdf",
        ]);
        match cli.command {
            Commands::Upload { on_conflict, .. } => assert_eq!(on_conflict, OnConflict::Ask),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "report-portal",
            "sites",
            "--base-url",
            "http://portal.local",
            "-v",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("http://portal.local"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_on_conflict_new_is_save_as_new() {
        let cli = Cli::parse_from([
            "report-portal",
            "upload",
            "admin",
            "rsi",
            "2024-01-05",
            "r.pdf",
            "--on-conflict",
            "new",
        ]);
        let Commands::Upload { on_conflict, .. } = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(on_conflict.decision(), Some(UploadDecision::SaveAsNew));
    }

    #[test]
    fn test_paths_lowercase_category() {
        assert_eq!(dates_path("admin", "MACD"), "/admin/dashboard/reports/macd/dates");
        assert_eq!(
            reports_path("shared", "RSI", "2024-01-05"),
            "/shared/dashboard/reports/rsi/2024-01-05/view"
        );
        assert_eq!(upload_path("admin"), "/admin/dashboard/upload");
    }

    #[test]
    fn test_arguments_cannot_change_path_shape() {
        assert_eq!(
            dates_path("admin/dashboard/upload#", "x"),
            "/admin%2Fdashboard%2Fupload%23/dashboard/reports/x/dates"
        );
        assert_eq!(
            reports_path("admin", "macd", "2024-01-05?x=1"),
            "/admin/dashboard/reports/macd/2024-01-05%3Fx%3D1/view"
        );
    }
}
