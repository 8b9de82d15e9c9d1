//! Repository for provenance and ODDPub metrics database operations

use sqlx::PgPool;

use super::models::{MetricsLinks, NewProvenance, OddpubMetricsRow};
use super::DbError;
use crate::model::OddpubMetrics;

/// Repository for ODDPub result persistence
#[derive(Clone)]
pub struct OddpubRepository {
    pool: PgPool,
}

impl OddpubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a provenance record and return its id
    pub async fn insert_provenance(&self, provenance: &NewProvenance) -> Result<i32, DbError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO provenance (pipeline_name, version, compute, personnel, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&provenance.pipeline_name)
        .bind(&provenance.version)
        .bind(&provenance.compute)
        .bind(&provenance.personnel)
        .bind(&provenance.comment)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id, pipeline = %provenance.pipeline_name, "Inserted provenance");
        Ok(id)
    }

    /// Insert or update the metrics of an article and return the row id
    pub async fn upsert_metrics(
        &self,
        metrics: &OddpubMetrics,
        links: MetricsLinks,
    ) -> Result<i32, DbError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO oddpub_metrics (
                article, is_open_data, open_data_category, is_reuse, is_open_code,
                is_open_data_das, is_open_code_cas, das, open_data_statements,
                cas, open_code_statements, work_id, provenance_id, document_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (article) DO UPDATE SET
                is_open_data = EXCLUDED.is_open_data,
                open_data_category = EXCLUDED.open_data_category,
                is_reuse = EXCLUDED.is_reuse,
                is_open_code = EXCLUDED.is_open_code,
                is_open_data_das = EXCLUDED.is_open_data_das,
                is_open_code_cas = EXCLUDED.is_open_code_cas,
                das = EXCLUDED.das,
                open_data_statements = EXCLUDED.open_data_statements,
                cas = EXCLUDED.cas,
                open_code_statements = EXCLUDED.open_code_statements,
                work_id = COALESCE(EXCLUDED.work_id, oddpub_metrics.work_id),
                provenance_id = EXCLUDED.provenance_id,
                document_id = COALESCE(EXCLUDED.document_id, oddpub_metrics.document_id)
            RETURNING id
            "#,
        )
        .bind(&metrics.article)
        .bind(metrics.is_open_data)
        .bind(&metrics.open_data_category)
        .bind(metrics.is_reuse)
        .bind(metrics.is_open_code)
        .bind(metrics.is_open_data_das)
        .bind(metrics.is_open_code_cas)
        .bind(&metrics.das)
        .bind(&metrics.open_data_statements)
        .bind(&metrics.cas)
        .bind(&metrics.open_code_statements)
        .bind(links.work_id)
        .bind(links.provenance_id)
        .bind(links.document_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id, article = %metrics.article, "Upserted ODDPub metrics");
        Ok(id)
    }

    /// Get the stored metrics of an article
    pub async fn get_by_article(&self, article: &str) -> Result<OddpubMetricsRow, DbError> {
        sqlx::query_as::<_, OddpubMetricsRow>(
            r#"
            SELECT * FROM oddpub_metrics WHERE article = $1
            "#,
        )
        .bind(article)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(article.to_string()))
    }
}
