//! Scan commands: resolve a tag and track progress locally.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use treetag_core::error::AppError;
use treetag_service::scan::ScanProgress;
use treetag_service::{QrPayload, ScanTracker};

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for scan commands
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Scan subcommand
    #[command(subcommand)]
    pub command: ScanCommand,
}

/// Scan subcommands
#[derive(Debug, Subcommand)]
pub enum ScanCommand {
    /// Resolve scanned text to a tree and count the scan
    Tag {
        /// Decoded QR text (a tag URL or a bare id)
        text: String,
    },
    /// Show scan count, points, and missions
    Progress,
}

/// Mission row for table output
#[derive(Debug, Serialize, Tabled)]
struct MissionRow {
    /// Title
    mission: String,
    /// Progress
    progress: String,
    /// Done
    done: String,
}

/// Execute scan commands
pub async fn execute(args: &ScanArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    let tracker = ScanTracker::new(ctx.local.clone(), ctx.config.app.points_per_scan);

    match &args.command {
        ScanCommand::Tag { text } => {
            let id = QrPayload::parse(text)?;
            let record = ctx.trees().fetch_field_record(&id).await?;
            let before = tracker.progress().await?;
            let after = tracker.record_scan().await?;

            output::print_success(&format!(
                "Found {} at {} ({})",
                record.profile.common_name,
                record.coordinates.location,
                QrPayload::route(&record.id)
            ));
            for mission in after.completed() {
                if !before.completed().any(|m| m.target == mission.target) {
                    output::print_success(&format!("Mission complete: {}", mission.title));
                }
            }
            print_progress(&after, format);
        }
        ScanCommand::Progress => {
            print_progress(&tracker.progress().await?, format);
        }
    }

    Ok(())
}

fn print_progress(progress: &ScanProgress, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_item(progress, format),
        OutputFormat::Table => {
            output::print_kv("Scans", &progress.scans.to_string());
            output::print_kv("Points", &progress.points.to_string());
            let rows: Vec<MissionRow> = progress
                .missions
                .iter()
                .map(|m| MissionRow {
                    mission: m.title.to_string(),
                    progress: format!("{}/{}", m.progress, m.target),
                    done: if m.completed { "yes" } else { "" }.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
}
