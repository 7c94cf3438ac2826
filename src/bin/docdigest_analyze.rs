use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use docdigest::{
    config, logging,
    pipeline::{AnalysisService, Document, FailedFile, FileOutcome, SummaryType},
};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "docdigest-analyze",
    about = "Summarize local PDF and image files with the configured LLM"
)]
struct Cli {
    /// Summary length: short, medium, or long. Unknown values fall back to short.
    #[arg(long, default_value = "short")]
    summary_type: String,
    /// Files to analyze, reported in the order given.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_cli_tracing();
    config::init_config();

    let service = AnalysisService::from_config(config::get_config())
        .context("failed to initialize chat client")?;
    let summary_type = SummaryType::parse_or_default(&cli.summary_type);

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let name = display_name(path);
        let outcome = match tokio::fs::read(path).await {
            Ok(bytes) => {
                service
                    .analyze_document(Document::new(name, bytes), summary_type)
                    .await
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Unable to read file");
                FileOutcome::Failed(FailedFile {
                    name,
                    error: format!("Failed to read: {error}"),
                })
            }
        };
        files.push(outcome);
    }

    let report = json!({ "ok": true, "files": files });
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("failed to write report")?;
    writeln!(stdout)?;
    Ok(())
}

/// File name used for format detection and reporting; falls back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
