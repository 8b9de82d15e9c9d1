//! ODDPub service API client
//!
//! Posts PDFs to a running `POST /oddpub` endpoint.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::model::OddpubMetrics;
use crate::oddpub::{OddpubError, PdfAnalyzer, UploadedPdf};

pub const ODDPUB_HOST_API_ENV: &str = "ODDPUB_HOST_API";
pub const DEFAULT_ODDPUB_HOST_API: &str = "http://localhost:8071";

#[derive(Debug, thiserror::Error)]
pub enum OddpubClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Service rejected {file}: status {status}: {body}")]
    Rejected {
        file: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<OddpubClientError> for OddpubError {
    fn from(err: OddpubClientError) -> Self {
        OddpubError::Remote(err.to_string())
    }
}

/// Client for a remote ODDPub service
pub struct OddpubClient {
    client: Client,
    base_url: String,
}

impl OddpubClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Create a client for `ODDPUB_HOST_API`, or the local default
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ODDPUB_HOST_API_ENV).unwrap_or_else(|_| DEFAULT_ODDPUB_HOST_API.to_string()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload one PDF and return the service's metrics record
    pub async fn submit(&self, pdf: UploadedPdf) -> Result<OddpubMetrics, OddpubClientError> {
        let url = format!("{}/oddpub", self.base_url);
        let file = pdf.file_name.clone();

        tracing::debug!(file = %file, url = %url, bytes = pdf.bytes.len(), "Submitting PDF to ODDPub service");

        let part = Part::bytes(pdf.bytes)
            .file_name(pdf.file_name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OddpubClientError::Rejected { file, status, body });
        }

        let metrics: OddpubMetrics = response
            .json()
            .await
            .map_err(|e| OddpubClientError::ParseError(format!("Failed to deserialize metrics: {}", e)))?;

        tracing::debug!(
            article = %metrics.article,
            is_open_data = metrics.is_open_data,
            is_open_code = metrics.is_open_code,
            "Received ODDPub metrics"
        );

        Ok(metrics)
    }
}

impl Default for OddpubClient {
    fn default() -> Self {
        Self::from_env()
    }
}

#[async_trait]
impl PdfAnalyzer for OddpubClient {
    async fn analyze(&self, pdf: UploadedPdf) -> Result<OddpubMetrics, OddpubError> {
        Ok(self.submit(pdf).await?)
    }

    fn name(&self) -> &'static str {
        "oddpub-remote"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{web, App, HttpServer};

    use super::*;
    use crate::app::AppState;
    use crate::model::{Config, DetectionConfig};
    use crate::oddpub::fixtures::pdf_with_lines;
    use crate::oddpub::OddpubAnalyzer;

    /// Serve the real API on an ephemeral port and return its base URL
    fn spawn_service() -> String {
        let analyzer = OddpubAnalyzer::new(&DetectionConfig::default()).unwrap();
        let state = web::Data::new(AppState::new(Arc::new(analyzer), Config::default()));

        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(crate::api::configure))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        format!("http://{}", addr)
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = OddpubClient::new("http://oddpub:8071/");
        assert_eq!(client.base_url(), "http://oddpub:8071");
    }

    #[actix_web::test]
    async fn test_submit_round_trip() {
        let client = OddpubClient::new(spawn_service());
        let bytes = pdf_with_lines(&[
            "Data availability",
            "All data are available on Zenodo at https://doi.org/10.5281/zenodo.42.",
        ]);

        let metrics = client
            .submit(UploadedPdf::new("sample.pdf", bytes))
            .await
            .unwrap();

        assert_eq!(metrics.article, "sample.txt");
        assert!(metrics.is_open_data);
        assert!(metrics.is_open_data_das);
        assert_eq!(metrics.open_data_category, "general-purpose repository");
    }

    #[actix_web::test]
    async fn test_submit_rejected_upload() {
        let client = OddpubClient::new(spawn_service());
        let err = client
            .submit(UploadedPdf::new("notes.pdf", b"plain text".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, OddpubClientError::Rejected { status: 415, .. }));

        let as_pipeline: OddpubError = err.into();
        assert!(matches!(as_pipeline, OddpubError::Remote(_)));
    }
}
