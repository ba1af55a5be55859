// crates/cli/src/main.rs
//! report-portal command-line client.
//!
//! Each invocation restores the persisted session, opens the requested view
//! through the same guards the interactive client uses, and prints it.

mod commands;
mod logging;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::{debug, error};

use commands::{dates_path, reports_path, upload_path, Cli, Commands, OnConflict};
use report_portal_client::{ClientConfig, PortalClient};
use report_portal_core::{Page, Portal, Route, SessionStore, UploadForm, UploadOutcome, Visit};
use report_portal_types::{Category, ReportId, ReportKey, UploadDecision, UploadFile};

const PASSWORD_ENV: &str = "REPORT_PORTAL_PASSWORD";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::default();
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    debug!(base_url = %config.base_url, timeout = ?config.timeout, "Using backend");

    let client = Arc::new(PortalClient::new(&config)?);
    let session = match cli.session_file {
        Some(path) => SessionStore::open(path)?,
        None => SessionStore::open_default()?,
    };
    let portal = Portal::new(session, client.clone(), client.clone());

    match cli.command {
        Commands::Login { email, password } => {
            let password = password
                .or_else(|| std::env::var(PASSWORD_ENV).ok())
                .ok_or_else(|| anyhow!("No password given (use --password or ${PASSWORD_ENV})"))?;
            let visit = portal.login(&email, &password).await?;
            println!("Logged in as {email}.");
            render(&visit, &client);
        }
        Commands::Logout => {
            portal.logout()?;
            println!("Logged out.");
        }
        Commands::Sites => {
            let visit = portal.open(&Route::SitePicker.path()).await?;
            require(&visit)?;
            render(&visit, &client);
        }
        Commands::Open { path } => {
            let visit = portal.open(&path).await?;
            render(&visit, &client);
        }
        Commands::Dates { site, category } => {
            let visit = portal.open(&dates_path(&site, &category)).await?;
            require(&visit)?;
            render(&visit, &client);
        }
        Commands::Reports {
            site,
            category,
            date,
        } => {
            let visit = portal.open(&reports_path(&site, &category, &date)).await?;
            require(&visit)?;
            render(&visit, &client);
        }
        Commands::Upload {
            site,
            category,
            date,
            file,
            on_conflict,
        } => {
            let visit = portal.open(&upload_path(&site)).await?;
            require(&visit)?;
            upload(&portal, &category, date, &file, on_conflict).await?;
        }
        Commands::Delete {
            site,
            category,
            date,
            id,
        } => {
            let visit = portal.open(&reports_path(&site, &category, &date)).await?;
            require(&visit)?;
            delete(&portal, &visit, id).await?;
        }
    }
    Ok(())
}

async fn upload(
    portal: &Portal,
    category: &str,
    date: String,
    path: &Path,
    on_conflict: OnConflict,
) -> Result<()> {
    let category: Category = category.parse()?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Not a file path: {}", path.display()))?;
    let form = UploadForm::new(category, date, Some(UploadFile::new(file_name, bytes)));

    let mut outcome = portal.submit_upload(&form).await?;
    if let UploadOutcome::Conflict(conflict) = &outcome {
        println!("{}", conflict.prompt());
        for report in &conflict.existing {
            println!("  #{:<6} {}", report.id, report.file_name);
        }
        let decision = match on_conflict.decision() {
            Some(decision) => decision,
            None => ask_decision().await?,
        };
        outcome = portal.decide_upload(decision).await?;
    }

    match outcome {
        UploadOutcome::Uploaded(report) => println!("Uploaded: {}", report.file_name),
        UploadOutcome::Cancelled => println!("Upload cancelled."),
        UploadOutcome::Conflict(_) => bail!("Upload is still waiting for a decision"),
    }
    Ok(())
}

async fn ask_decision() -> Result<UploadDecision> {
    tokio::task::spawn_blocking(|| -> Result<UploadDecision> {
        let stdin = io::stdin();
        loop {
            print!("[o]verride, save as [n]ew, or [c]ancel? ");
            io::stdout().flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(UploadDecision::Cancel);
            }
            match line.parse() {
                Ok(decision) => return Ok(decision),
                Err(e) => eprintln!("{e}"),
            }
        }
    })
    .await?
}

async fn delete(portal: &Portal, visit: &Visit, id: ReportId) -> Result<()> {
    let Page::Reports { key, reports } = &visit.page else {
        bail!("Not on a report listing ({})", visit.route);
    };
    let report = reports
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| anyhow!("No report #{id} filed under {key}"))?;
    portal.delete_report(id).await?;
    println!("Deleted #{id} {}", report.file_name);
    Ok(())
}

/// Commands aimed at one specific view fail when a guard sent them elsewhere.
fn require(visit: &Visit) -> Result<()> {
    if let Some(reason) = visit.redirect {
        bail!("Cannot open that view: {reason} (redirected to {})", visit.route);
    }
    if let Page::NotFound { path } = &visit.page {
        bail!("No such page: {path}");
    }
    Ok(())
}

fn render(visit: &Visit, client: &PortalClient) {
    if let Some(reason) = visit.redirect {
        println!("Redirected to {} ({reason})", visit.route);
    }
    match &visit.page {
        Page::Login => println!("Not logged in. Run `report-portal login --email <email>`."),
        Page::SitePicker { sites } => {
            if sites.is_empty() {
                println!("No sites are available to this account.");
            }
            for site in sites {
                println!("{:<10} {:<10} {}", site.as_str(), site.label(), site.description());
            }
        }
        Page::Dashboard { site, entries } => {
            println!("{} dashboard", site.label());
            for entry in entries {
                println!("  {:<16} {}", entry.label(), entry.route(*site));
            }
        }
        Page::CategoryDates {
            site,
            category,
            dates,
        } => {
            println!("{category} reports on {}", site.label());
            if dates.is_empty() {
                println!("  No reports yet.");
            }
            for date in dates {
                let route = Route::ReportsForDate(ReportKey::new(*site, *category, *date));
                println!("  {}  {}", date.display_label(), route);
            }
        }
        Page::Reports { key, reports } => {
            println!("{} {} reports for {}", key.site.label(), key.category, key.date.display_label());
            if reports.is_empty() {
                println!("  No reports for this date.");
            }
            for report in reports {
                let action = if report.is_inline_viewable() { "view" } else { "download" };
                println!(
                    "  #{:<6} {:<40} {:<8} {}",
                    report.id,
                    report.file_name,
                    action,
                    client.report_url(report)
                );
            }
        }
        Page::UploadForm {
            site,
            categories,
            status,
        } => {
            println!("Upload a report to {}", site.label());
            let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
            println!("  Categories: {}", names.join(", "));
            if let Some(message) = &status.message {
                println!("  {message}");
            }
        }
        Page::NotFound { path } => println!("No such page: {path}"),
    }
}
