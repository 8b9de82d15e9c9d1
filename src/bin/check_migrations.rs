//! Checks that the database schema matches the migrations shipped with this binary.
//!
//! Exit codes: 0 when clean, 1 when migrations are pending or drifted,
//! 2 when the check could not run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dsst_etl::db::migrations::{self, MigrationReport};
use dsst_etl::db::{self, DbConfig};
use dsst_etl::envfile::{EnvFile, EnvMode, EnvSource};

const EXIT_ISSUES: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "check-migrations", version, about = "Check for pending or drifted schema migrations")]
struct Args {
    /// Directory holding .env / .mockenv
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Overwrite .env with .mockenv before loading it
    #[arg(long)]
    sync_mock: bool,

    /// Apply pending migrations when nothing else has drifted
    #[arg(long)]
    upgrade: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dsst_etl::init_tracing();
    let args = Args::parse();

    match run(&args).await {
        Ok(report) if report.is_clean() => {
            println!("========================================");
            println!(" Migrations are up to date ({} applied)", report.applied);
            println!("========================================");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for issue in &report.issues {
                println!("  - {}", issue);
            }
            println!("========================================");
            println!(" Migration check FAILED: {} issue(s)", report.issues.len());
            if report.only_pending() {
                println!(" Run with --upgrade to apply pending migrations");
            } else {
                println!(" Drifted migrations must be resolved by hand before upgrading");
            }
            println!("========================================");
            ExitCode::from(EXIT_ISSUES)
        }
        Err(e) => {
            eprintln!("Migration check could not run: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<MigrationReport> {
    let mode = if args.sync_mock {
        EnvMode::SyncFromMock
    } else {
        EnvMode::PreferReal
    };

    let env = EnvFile::load(&args.dir, mode)?;
    match &env.source {
        Some(EnvSource::Real(path)) => println!("Using environment file {}", path.display()),
        Some(EnvSource::Mock(path)) => println!("Using mock environment file {}", path.display()),
        None => println!("No environment file found, using process environment"),
    }

    let config = DbConfig::from_lookup(|key| env.lookup(key))?;
    let pool = db::create_pool(&config).await?;

    let report = migrations::check_and_upgrade(&pool, args.upgrade).await?;
    pool.close().await;

    Ok(report)
}
