//! QR tag commands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use treetag_core::error::AppError;
use treetag_service::QrPayload;

use crate::output;

use super::Context;

/// Arguments for QR commands
#[derive(Debug, Args)]
pub struct QrArgs {
    /// QR subcommand
    #[command(subcommand)]
    pub command: QrCommand,
}

/// Tag rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum QrRender {
    /// Block characters in the terminal
    #[default]
    Text,
    /// SVG image
    Svg,
    /// The encoded URL only
    Url,
}

/// QR subcommands
#[derive(Debug, Subcommand)]
pub enum QrCommand {
    /// Generate the tag for a placed tree
    Generate {
        /// Field record id
        id: String,
        /// Rendering
        #[arg(short, long, value_enum, default_value = "text")]
        render: QrRender,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Execute QR commands
pub async fn execute(args: &QrArgs, ctx: &Context) -> Result<(), AppError> {
    match &args.command {
        QrCommand::Generate { id, render, out } => {
            let record = ctx.trees().fetch_field_record(id).await?;
            let payload = QrPayload::for_field_record(&ctx.config.app.public_base_url, &record.id);

            let body = match render {
                QrRender::Text => payload.render_text()?,
                QrRender::Svg => payload.render_svg()?,
                QrRender::Url => payload.url().to_string(),
            };

            match out {
                Some(path) => {
                    tokio::fs::write(path, body.as_bytes()).await?;
                    output::print_success(&format!(
                        "Wrote tag for '{}' to {}",
                        record.profile.common_name,
                        path.display()
                    ));
                }
                None => {
                    println!("{body}");
                    if *render == QrRender::Text {
                        println!("{}", payload.url());
                    }
                }
            }
        }
    }

    Ok(())
}
