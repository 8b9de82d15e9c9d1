//! PDF upload endpoint

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures::StreamExt;
use utoipa::ToSchema;

use super::error::ApiError;
use crate::app::AppState;
use crate::oddpub::UploadedPdf;

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "upload.pdf";

/// Multipart form accepted by `POST /oddpub`
#[derive(ToSchema)]
#[allow(dead_code)] // Schema only
pub struct UploadForm {
    /// The PDF to analyze
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Analyze a PDF for open data and open code statements
#[utoipa::path(
    post,
    path = "/oddpub",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis completed", body = crate::model::OddpubMetrics),
        (status = 400, description = "Missing or empty file field", body = super::error::ErrorResponse),
        (status = 415, description = "Upload is not a PDF", body = super::error::ErrorResponse),
        (status = 422, description = "PDF is corrupt or encrypted", body = super::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::error::ErrorResponse)
    ),
    tag = "oddpub"
)]
#[post("/oddpub")]
pub async fn analyze_pdf(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let pdf = read_upload(payload).await?;

    tracing::info!(file = %pdf.file_name, bytes = pdf.bytes.len(), "Received PDF");

    let metrics = state.analyzer.analyze(pdf).await?;

    tracing::info!(
        article = %metrics.article,
        is_open_data = metrics.is_open_data,
        is_open_code = metrics.is_open_code,
        "Analysis completed"
    );

    Ok(HttpResponse::Ok().json(metrics))
}

/// Read the `file` field of the form; other fields are drained and ignored
async fn read_upload(mut payload: Multipart) -> Result<UploadedPdf, ApiError> {
    let mut upload: Option<UploadedPdf> = None;

    while let Some(field) = payload.next().await {
        let mut field = field?;

        let is_file = upload.is_none() && field.name() == Some(FILE_FIELD);
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(base_name)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if is_file {
                bytes.extend_from_slice(&chunk);
            }
        }

        if is_file {
            upload = Some(UploadedPdf::new(file_name, bytes));
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    if upload.bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    Ok(upload)
}

/// Last path component of a client-supplied file name
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

/// Configure upload routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_pdf);
}
