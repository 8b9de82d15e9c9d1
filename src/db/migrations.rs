//! Schema migration consistency checks
//!
//! Migrations under `migrations/` are embedded at compile time. A database is
//! consistent when every embedded migration has been applied successfully with
//! the same checksum and no unknown migration is recorded.

use std::collections::BTreeMap;
use std::fmt;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Failed to read applied migrations: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to apply migrations: {0}")]
    Apply(#[from] MigrateError),
}

/// A migration shipped with this binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMigration {
    pub version: i64,
    pub description: String,
    pub checksum: Vec<u8>,
}

/// A row of the `_sqlx_migrations` bookkeeping table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: String,
    pub checksum: Vec<u8>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationIssue {
    /// Shipped but not applied yet
    Pending { version: i64, description: String },
    /// Applied, but the shipped file has changed since
    ChecksumMismatch { version: i64, description: String },
    /// Recorded as failed
    Failed { version: i64, description: String },
    /// Applied but not shipped with this binary
    Unknown { version: i64, description: String },
}

impl fmt::Display for MigrationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationIssue::Pending { version, description } => {
                write!(f, "pending: {} {}", version, description)
            }
            MigrationIssue::ChecksumMismatch { version, description } => {
                write!(f, "checksum mismatch: {} {} was modified after it was applied", version, description)
            }
            MigrationIssue::Failed { version, description } => {
                write!(f, "failed: {} {} did not complete", version, description)
            }
            MigrationIssue::Unknown { version, description } => {
                write!(f, "unknown: {} {} is applied but missing locally", version, description)
            }
        }
    }
}

/// Result of comparing local migrations against the database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub local: usize,
    pub applied: usize,
    pub issues: Vec<MigrationIssue>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether applying migrations would resolve every issue
    pub fn only_pending(&self) -> bool {
        !self.issues.is_empty()
            && self
                .issues
                .iter()
                .all(|issue| matches!(issue, MigrationIssue::Pending { .. }))
    }
}

/// Up-migrations embedded in the binary, in version order
pub fn local_migrations() -> Vec<LocalMigration> {
    let mut local: Vec<LocalMigration> = MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| LocalMigration {
            version: m.version,
            description: m.description.to_string(),
            checksum: m.checksum.to_vec(),
        })
        .collect();
    local.sort_by_key(|m| m.version);
    local
}

/// Compare shipped migrations with what the database has recorded
pub fn compare(local: &[LocalMigration], applied: &[AppliedMigration]) -> MigrationReport {
    let applied_by_version: BTreeMap<i64, &AppliedMigration> =
        applied.iter().map(|a| (a.version, a)).collect();
    let local_by_version: BTreeMap<i64, &LocalMigration> =
        local.iter().map(|l| (l.version, l)).collect();

    let mut issues = Vec::new();

    for (version, migration) in &local_by_version {
        let description = migration.description.clone();
        match applied_by_version.get(version) {
            None => issues.push(MigrationIssue::Pending {
                version: *version,
                description,
            }),
            Some(row) if !row.success => issues.push(MigrationIssue::Failed {
                version: *version,
                description,
            }),
            Some(row) if row.checksum != migration.checksum => {
                issues.push(MigrationIssue::ChecksumMismatch {
                    version: *version,
                    description,
                })
            }
            Some(_) => {}
        }
    }

    for (version, row) in &applied_by_version {
        if !local_by_version.contains_key(version) {
            issues.push(MigrationIssue::Unknown {
                version: *version,
                description: row.description.clone(),
            });
        }
    }

    MigrationReport {
        local: local.len(),
        applied: applied.len(),
        issues,
    }
}

/// Read the bookkeeping table; a database that was never migrated has none
pub async fn fetch_applied(pool: &PgPool) -> Result<Vec<AppliedMigration>, MigrationError> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;

    if !exists {
        tracing::info!("Migration table does not exist yet");
        return Ok(Vec::new());
    }

    let applied = sqlx::query_as::<_, AppliedMigration>(
        r#"
        SELECT version, description, checksum, success
        FROM _sqlx_migrations
        ORDER BY version
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(applied)
}

/// Compare the embedded migrations with the connected database
pub async fn check(pool: &PgPool) -> Result<MigrationReport, MigrationError> {
    let applied = fetch_applied(pool).await?;
    let report = compare(&local_migrations(), &applied);

    tracing::info!(
        local = report.local,
        applied = report.applied,
        issues = report.issues.len(),
        "Migration check completed"
    );

    Ok(report)
}

/// Apply every pending migration
pub async fn upgrade(pool: &PgPool) -> Result<(), MigrationError> {
    tracing::info!("Applying pending migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Check the database and, when `upgrade` is set and the only issues are
/// pending migrations, apply them and check again.
///
/// A database with edited, failed or unknown migrations is left untouched and
/// its report is returned as is.
pub async fn check_and_upgrade(
    pool: &PgPool,
    upgrade: bool,
) -> Result<MigrationReport, MigrationError> {
    let report = check(pool).await?;
    if !upgrade || report.is_clean() {
        return Ok(report);
    }

    if !report.only_pending() {
        tracing::warn!(
            issues = report.issues.len(),
            "Database has drifted from the shipped migrations, skipping upgrade"
        );
        return Ok(report);
    }

    self::upgrade(pool).await?;
    check(pool).await
}
