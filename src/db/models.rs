//! Database models for provenance and ODDPub results

use sqlx::FromRow;

use crate::model::OddpubMetrics;

/// A provenance record to insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProvenance {
    pub pipeline_name: String,
    pub version: String,
    pub compute: String,
    pub personnel: String,
    pub comment: Option<String>,
}

/// Links written alongside a metrics row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsLinks {
    pub work_id: Option<i32>,
    pub document_id: Option<i32>,
    pub provenance_id: Option<i32>,
}

/// Database representation of an `oddpub_metrics` row
#[derive(Debug, Clone, FromRow)]
pub struct OddpubMetricsRow {
    pub id: i32,
    pub article: Option<String>,
    pub is_open_data: Option<bool>,
    pub open_data_category: Option<String>,
    pub is_reuse: Option<bool>,
    pub is_open_code: Option<bool>,
    pub is_open_data_das: Option<bool>,
    pub is_open_code_cas: Option<bool>,
    pub das: Option<String>,
    pub open_data_statements: Option<String>,
    pub cas: Option<String>,
    pub open_code_statements: Option<String>,
    pub work_id: Option<i32>,
    pub provenance_id: Option<i32>,
    pub document_id: Option<i32>,
}

impl OddpubMetricsRow {
    /// Convert database row to domain model; NULL flags read as false
    pub fn into_domain(self) -> OddpubMetrics {
        OddpubMetrics {
            article: self.article.unwrap_or_default(),
            is_open_data: self.is_open_data.unwrap_or(false),
            open_data_category: self.open_data_category.unwrap_or_default(),
            is_reuse: self.is_reuse.unwrap_or(false),
            is_open_code: self.is_open_code.unwrap_or(false),
            is_open_data_das: self.is_open_data_das.unwrap_or(false),
            is_open_code_cas: self.is_open_code_cas.unwrap_or(false),
            das: self.das,
            open_data_statements: self.open_data_statements.unwrap_or_default(),
            cas: self.cas,
            open_code_statements: self.open_code_statements.unwrap_or_default(),
        }
    }

    pub fn links(&self) -> MetricsLinks {
        MetricsLinks {
            work_id: self.work_id,
            document_id: self.document_id,
            provenance_id: self.provenance_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_columns_map_to_defaults() {
        let row = OddpubMetricsRow {
            id: 7,
            article: Some("paper.txt".to_string()),
            is_open_data: Some(true),
            open_data_category: Some("supplement".to_string()),
            is_reuse: None,
            is_open_code: None,
            is_open_data_das: Some(true),
            is_open_code_cas: None,
            das: Some("Data availability".to_string()),
            open_data_statements: None,
            cas: None,
            open_code_statements: None,
            work_id: Some(3),
            provenance_id: None,
            document_id: None,
        };

        assert_eq!(row.links().work_id, Some(3));

        let metrics = row.into_domain();
        assert_eq!(metrics.article, "paper.txt");
        assert!(metrics.is_open_data);
        assert!(!metrics.is_reuse);
        assert_eq!(metrics.open_data_statements, "");
        assert_eq!(metrics.das.as_deref(), Some("Data availability"));
        assert!(metrics.cas.is_none());
    }
}
