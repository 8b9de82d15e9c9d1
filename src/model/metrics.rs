use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Open-science indicators detected in a single publication.
///
/// All eleven fields are always serialized; `das` and `cas` are `null` when
/// the document has no availability section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OddpubMetrics {
    /// Converted text file name, e.g. `paper.txt` for `paper.pdf`
    pub article: String,
    pub is_open_data: bool,
    /// Comma-separated category labels, empty if no open data was found
    pub open_data_category: String,
    pub is_reuse: bool,
    pub is_open_code: bool,
    /// Open data detected inside a Data Availability Statement
    pub is_open_data_das: bool,
    /// Open code detected inside a Code Availability Statement
    pub is_open_code_cas: bool,
    pub das: Option<String>,
    pub open_data_statements: String,
    pub cas: Option<String>,
    pub open_code_statements: String,
}

impl OddpubMetrics {
    /// Empty result for an article with no detectable statements
    pub fn empty(article: impl Into<String>) -> Self {
        Self {
            article: article.into(),
            ..Self::default()
        }
    }
}

/// Where an open-data statement points the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpenDataCategory {
    FieldSpecificRepository,
    GeneralPurposeRepository,
    Supplement,
}

impl OpenDataCategory {
    pub fn label(&self) -> &'static str {
        match self {
            OpenDataCategory::FieldSpecificRepository => "field-specific repository",
            OpenDataCategory::GeneralPurposeRepository => "general-purpose repository",
            OpenDataCategory::Supplement => "supplement",
        }
    }
}

/// Derive the article identifier ODDPub uses for an uploaded file name
pub fn article_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("upload.pdf");

    let stem = match base.rfind('.') {
        Some(idx) if base[idx..].eq_ignore_ascii_case(".pdf") && idx > 0 => &base[..idx],
        _ => base,
    };

    format!("{}.txt", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_all_fields() {
        let value = serde_json::to_value(OddpubMetrics::empty("test1.txt")).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 11);
        assert_eq!(obj["article"], "test1.txt");
        assert!(obj["das"].is_null());
        assert!(obj["cas"].is_null());
        assert_eq!(obj["open_data_statements"], "");
    }

    #[test]
    fn test_deserializes_service_payload() {
        let payload = serde_json::json!({
            "article": "test1.txt",
            "is_open_data": false,
            "open_data_category": "",
            "is_reuse": false,
            "is_open_code": false,
            "is_open_data_das": false,
            "is_open_code_cas": false,
            "das": null,
            "open_data_statements": "",
            "cas": null,
            "open_code_statements": ""
        });
        let metrics: OddpubMetrics = serde_json::from_value(payload).unwrap();
        assert_eq!(metrics, OddpubMetrics::empty("test1.txt"));
    }

    #[test]
    fn test_article_name() {
        assert_eq!(article_name("test1.pdf"), "test1.txt");
        assert_eq!(article_name("Paper.PDF"), "Paper.txt");
        assert_eq!(article_name("../../etc/passwd"), "passwd.txt");
        assert_eq!(article_name("C:\\docs\\study.v2.pdf"), "study.v2.txt");
        assert_eq!(article_name(""), "upload.txt");
        assert_eq!(article_name("dir/"), "upload.txt");
    }
}
