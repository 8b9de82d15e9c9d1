//! Batch ingestion of a folder of PDFs
//!
//! Every PDF is analyzed and its metrics stored under one provenance record.
//! A failing file is logged and counted; the batch carries on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::db::models::{MetricsLinks, NewProvenance};
use crate::db::repository::OddpubRepository;
use crate::db::DbError;
use crate::model::OddpubMetrics;
use crate::oddpub::{OddpubError, PdfAnalyzer, UploadedPdf};

pub const PIPELINE_NAME: &str = "oddpub";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Cannot read PDF folder {path}: {source}")]
    Folder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Analysis(#[from] OddpubError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Where batch results are written
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Record the batch provenance and return its id
    async fn start_batch(&self, provenance: &NewProvenance) -> Result<i32, DbError>;

    /// Persist one article's metrics
    async fn save(&self, metrics: &OddpubMetrics, links: MetricsLinks) -> Result<i32, DbError>;
}

#[async_trait]
impl MetricsStore for OddpubRepository {
    async fn start_batch(&self, provenance: &NewProvenance) -> Result<i32, DbError> {
        self.insert_provenance(provenance).await
    }

    async fn save(&self, metrics: &OddpubMetrics, links: MetricsLinks) -> Result<i32, DbError> {
        match self.get_by_article(&metrics.article).await {
            Ok(previous) => tracing::info!(
                article = %metrics.article,
                id = previous.id,
                previous_provenance_id = ?previous.provenance_id,
                "Replacing stored metrics"
            ),
            Err(DbError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.upsert_metrics(metrics, links).await
    }
}

/// Batch options
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub work_id: Option<i32>,
    pub document_id: Option<i32>,
    pub personnel: String,
    pub compute: String,
    pub comment: Option<String>,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    pub provenance_id: i32,
    pub stored: Vec<String>,
    pub failed: Vec<(PathBuf, String)>,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.stored.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs a folder of PDFs through an analyzer into a store
pub struct IngestService {
    analyzer: Arc<dyn PdfAnalyzer>,
    store: Arc<dyn MetricsStore>,
}

impl IngestService {
    pub fn new(analyzer: Arc<dyn PdfAnalyzer>, store: Arc<dyn MetricsStore>) -> Self {
        Self { analyzer, store }
    }

    pub async fn process_folder(
        &self,
        folder: &Path,
        options: &IngestOptions,
    ) -> Result<IngestSummary, IngestError> {
        let pdfs = list_pdfs(folder)?;

        tracing::info!(
            folder = %folder.display(),
            files = pdfs.len(),
            analyzer = self.analyzer.name(),
            "Starting ODDPub batch"
        );

        let provenance_id = self
            .store
            .start_batch(&NewProvenance {
                pipeline_name: PIPELINE_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                compute: options.compute.clone(),
                personnel: options.personnel.clone(),
                comment: options.comment.clone(),
            })
            .await?;

        let links = MetricsLinks {
            work_id: options.work_id,
            document_id: options.document_id,
            provenance_id: Some(provenance_id),
        };

        let mut summary = IngestSummary {
            provenance_id,
            ..Default::default()
        };

        for path in pdfs {
            match self.process_file(&path, links).await {
                Ok(article) => {
                    tracing::info!(file = %path.display(), article = %article, "Stored ODDPub metrics");
                    summary.stored.push(article);
                }
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "Failed to process PDF");
                    summary.failed.push((path, e.to_string()));
                }
            }
        }

        tracing::info!(
            provenance_id,
            stored = summary.stored.len(),
            failed = summary.failed.len(),
            "ODDPub batch finished"
        );

        Ok(summary)
    }

    async fn process_file(&self, path: &Path, links: MetricsLinks) -> Result<String, IngestError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metrics = self.analyzer.analyze(UploadedPdf::new(file_name, bytes)).await?;
        self.store.save(&metrics, links).await?;

        Ok(metrics.article)
    }
}

/// PDF files directly inside `folder`, sorted by path
pub fn list_pdfs(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let to_error = |source| IngestError::Folder {
        path: folder.to_path_buf(),
        source,
    };

    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(to_error)? {
        let path = entry.map_err(to_error)?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

/// Stable identifier of the machine and user running a batch
pub fn compute_context_id(hostname: &str, username: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}", hostname, username).as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::DetectionConfig;
    use crate::oddpub::fixtures::pdf_with_lines;
    use crate::oddpub::OddpubAnalyzer;

    #[derive(Default)]
    struct MemoryStore {
        batches: Mutex<Vec<NewProvenance>>,
        saved: Mutex<Vec<(OddpubMetrics, MetricsLinks)>>,
    }

    #[async_trait]
    impl MetricsStore for MemoryStore {
        async fn start_batch(&self, provenance: &NewProvenance) -> Result<i32, DbError> {
            let mut batches = self.batches.lock().unwrap();
            batches.push(provenance.clone());
            Ok(batches.len() as i32)
        }

        async fn save(&self, metrics: &OddpubMetrics, links: MetricsLinks) -> Result<i32, DbError> {
            let mut saved = self.saved.lock().unwrap();
            saved.push((metrics.clone(), links));
            Ok(saved.len() as i32)
        }
    }

    fn service(store: Arc<MemoryStore>) -> IngestService {
        let analyzer = OddpubAnalyzer::new(&DetectionConfig::default()).unwrap();
        IngestService::new(Arc::new(analyzer), store)
    }

    #[test]
    fn test_list_pdfs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = list_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_list_pdfs_missing_folder() {
        let err = list_pdfs(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, IngestError::Folder { .. }));
    }

    #[test]
    fn test_compute_context_id() {
        let id = compute_context_id("host", "alice");
        assert_eq!(id.len(), 64);
        assert_eq!(id, compute_context_id("host", "alice"));
        assert_ne!(id, compute_context_id("host", "bob"));
    }

    #[tokio::test]
    async fn test_process_folder_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("good.pdf"),
            pdf_with_lines(&["Code availability", "The code is on GitHub at https://github.com/a/b."]),
        )
        .unwrap();
        std::fs::write(dir.path().join("bad.pdf"), b"not a pdf").unwrap();

        let store = Arc::new(MemoryStore::default());
        let options = IngestOptions {
            work_id: Some(11),
            personnel: "tester".to_string(),
            compute: compute_context_id("host", "tester"),
            ..Default::default()
        };

        let summary = service(store.clone())
            .process_folder(dir.path(), &options)
            .await
            .unwrap();

        assert_eq!(summary.total(), 2);
        assert!(!summary.is_success());
        assert_eq!(summary.stored, vec!["good.txt"]);
        assert!(summary.failed[0].0.ends_with("bad.pdf"));

        let batches = store.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].pipeline_name, PIPELINE_NAME);
        assert_eq!(batches[0].personnel, "tester");

        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let (metrics, links) = &saved[0];
        assert!(metrics.is_open_code);
        assert!(metrics.is_open_code_cas);
        assert_eq!(links.work_id, Some(11));
        assert_eq!(links.provenance_id, Some(summary.provenance_id));
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::default());
        let summary = service(store.clone())
            .process_folder(dir.path(), &IngestOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.total(), 0);
        assert!(summary.is_success());
        assert_eq!(store.batches.lock().unwrap().len(), 1);
    }
}
