//! Runs every PDF of a folder through ODDPub and stores the results.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use dsst_etl::db::repository::OddpubRepository;
use dsst_etl::db::{self, migrations, DbConfig};
use dsst_etl::model::Config;
use dsst_etl::oddpub::{OddpubAnalyzer, PdfAnalyzer};
use dsst_etl::service::ingest::{compute_context_id, IngestOptions, IngestService};
use dsst_etl::service::oddpub_client::{OddpubClient, DEFAULT_ODDPUB_HOST_API, ODDPUB_HOST_API_ENV};

#[derive(Debug, Parser)]
#[command(name = "run-oddpub", version, about = "Process PDFs with ODDPub and store the metrics")]
struct Args {
    /// Path to the folder containing PDF files
    pdf_folder: PathBuf,

    /// ODDPub service base URL
    #[arg(long, env = ODDPUB_HOST_API_ENV, default_value = DEFAULT_ODDPUB_HOST_API)]
    oddpub_host_api: String,

    /// Analyze in-process instead of calling the service
    #[arg(long)]
    local: bool,

    /// Work the PDFs belong to
    #[arg(long)]
    work_id: Option<i32>,

    /// Document the PDFs belong to
    #[arg(long)]
    document_id: Option<i32>,

    /// Comment stored with the batch provenance
    #[arg(long)]
    comment: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    dsst_etl::init_tracing();
    let args = Args::parse();

    let analyzer: Arc<dyn PdfAnalyzer> = if args.local {
        let config = Config::from_env();
        Arc::new(OddpubAnalyzer::new(&config.detection)?)
    } else {
        Arc::new(OddpubClient::new(&args.oddpub_host_api))
    };

    let db_config = DbConfig::from_env()?;
    let pool = db::create_pool(&db_config)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let report = migrations::check(&pool).await?;
    if !report.is_clean() {
        anyhow::bail!(
            "Database schema is not up to date ({} issue(s)); run check-migrations --upgrade",
            report.issues.len()
        );
    }

    let hostname = std::env::var("HOSTNAME").unwrap_or_default();
    let username = std::env::var("USER").unwrap_or_default();
    let options = IngestOptions {
        work_id: args.work_id,
        document_id: args.document_id,
        personnel: username.clone(),
        compute: compute_context_id(&hostname, &username),
        comment: args.comment,
    };

    let service = IngestService::new(analyzer, Arc::new(OddpubRepository::new(pool)));
    let summary = service
        .process_folder(&args.pdf_folder, &options)
        .await
        .with_context(|| format!("Failed to process {}", args.pdf_folder.display()))?;

    println!(
        "Processed {} PDF(s): {} stored, {} failed (provenance {})",
        summary.total(),
        summary.stored.len(),
        summary.failed.len(),
        summary.provenance_id
    );
    for (path, error) in &summary.failed {
        println!("  - {}: {}", path.display(), error);
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
