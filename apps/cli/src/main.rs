//! filedrop: upload one file through the widget lifecycle from a terminal.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use filedrop_http::HttpTransport;
use filedrop_uploader::{CandidateFile, Phase, SelectionOutcome, UploadController, UploaderOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::render::{OutputFormat, Renderer};

/// Validate a file and upload it to an HTTP endpoint.
#[derive(Parser, Debug)]
#[command(name = "filedrop", author, version, about, long_about = None)]
struct Args {
    /// JSON options file (acceptedTypes, maxFileSizeMB, uploaderURL, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upload endpoint, overrides `uploaderURL` from the options
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Print every widget snapshot as a JSON line
    #[arg(long)]
    json: bool,

    /// File to upload
    path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,filedrop=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut options = match &args.config {
        Some(path) => UploaderOptions::load(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => UploaderOptions::default(),
    };
    if let Some(endpoint) = args.endpoint {
        options.uploader_url = endpoint;
    }
    let config = options
        .into_configuration()
        .context("invalid uploader options")?;
    debug!(endpoint = %config.endpoint(), accept = %config.accept_attribute(), "configuration ready");

    let file = CandidateFile::from_path(&args.path)
        .await
        .with_context(|| format!("cannot read {}", args.path.display()))?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut renderer = Renderer::new(std::io::stdout(), format, config.display().clone());
    renderer.prompt(&config)?;

    let transport = Arc::new(HttpTransport::new()?);
    let mut controller = UploadController::new(config, transport);

    let outcome = controller.file_selected(Some(file));
    renderer.show(&controller.snapshot())?;

    match outcome {
        SelectionOutcome::Started(session) => {
            info!(%session, "upload session started");
            while controller.state().phase() == Phase::Uploading {
                if controller.process_next().await.is_ok() {
                    renderer.show(&controller.snapshot())?;
                }
            }
        }
        SelectionOutcome::Rejected(rejection) => {
            debug!(%rejection, "selection rejected");
            return Ok(ExitCode::FAILURE);
        }
        SelectionOutcome::Ignored => return Ok(ExitCode::FAILURE),
    }

    Ok(match controller.state().phase() {
        Phase::Complete => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
