//! Open data and open code detection for PDF publications
//!
//! The pipeline mirrors ODDPub's three steps:
//! 1. convert the PDF to page text
//! 2. load the text as sentences
//! 3. search the sentences for open data / open code statements

pub mod convert;
pub mod patterns;
pub mod search;
pub mod sentences;

use async_trait::async_trait;

use crate::model::{article_name, DetectionConfig, OddpubMetrics};

pub use convert::{convert, ConvertedPdf};
pub use patterns::Patterns;
pub use search::StatementSearch;
pub use sentences::{Sentence, SentenceSplitter};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OddpubError {
    #[error("Uploaded file is not a PDF")]
    NotPdf,

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("Invalid detection pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Analysis task failed: {0}")]
    Task(String),

    #[error("Remote analysis failed: {0}")]
    Remote(String),
}

/// A PDF received for analysis
#[derive(Debug, Clone)]
pub struct UploadedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedPdf {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn article(&self) -> String {
        article_name(&self.file_name)
    }
}

/// Trait for open-science analyzers of a single PDF
#[async_trait]
pub trait PdfAnalyzer: Send + Sync {
    /// Analyze one PDF and produce its metrics record
    async fn analyze(&self, pdf: UploadedPdf) -> Result<OddpubMetrics, OddpubError>;

    /// Short name of the analyzer backend
    fn name(&self) -> &'static str;
}

/// In-process ODDPub-style analyzer
#[derive(Clone)]
pub struct OddpubAnalyzer {
    patterns: Patterns,
    splitter: SentenceSplitter,
}

impl OddpubAnalyzer {
    pub fn new(config: &DetectionConfig) -> Result<Self, OddpubError> {
        Ok(Self {
            patterns: Patterns::new(config)?,
            splitter: SentenceSplitter::new()?,
        })
    }

    /// Run convert, load and search synchronously
    pub fn process(&self, pdf: &UploadedPdf) -> Result<OddpubMetrics, OddpubError> {
        let article = pdf.article();

        let converted = convert(&pdf.bytes)?;
        if converted.is_blank() {
            tracing::warn!(article = %article, "PDF contains no extractable text");
            return Ok(OddpubMetrics::empty(article));
        }

        let sentences = self.splitter.load(&converted, &self.patterns);
        tracing::debug!(article = %article, sentences = sentences.len(), "Loaded PDF text");

        Ok(StatementSearch::new(&self.patterns).search(&article, &sentences))
    }
}

#[async_trait]
impl PdfAnalyzer for OddpubAnalyzer {
    async fn analyze(&self, pdf: UploadedPdf) -> Result<OddpubMetrics, OddpubError> {
        // PDF parsing is CPU bound; keep it off the async workers
        let analyzer = self.clone();
        tokio::task::spawn_blocking(move || analyzer.process(&pdf))
            .await
            .map_err(|e| OddpubError::Task(e.to_string()))?
    }

    fn name(&self) -> &'static str {
        "oddpub"
    }
}
