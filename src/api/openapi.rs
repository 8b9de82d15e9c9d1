//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

use super::error::{ApiError, ErrorResponse};
use super::health::{HealthStatus, ReadinessStatus};
use super::oddpub::UploadForm;
use crate::model::OddpubMetrics;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ODDPub service",
        description = "Open data and open code detection for PDF publications"
    ),
    paths(
        super::oddpub::analyze_pdf,
        super::health::liveness,
        super::health::readiness,
    ),
    components(schemas(OddpubMetrics, UploadForm, ErrorResponse, HealthStatus, ReadinessStatus)),
    tags(
        (name = "oddpub", description = "PDF analysis"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> Result<HttpResponse, ApiError> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| ApiError::Internal(format!("Failed to render OpenAPI YAML: {}", e)))?;

    Ok(HttpResponse::Ok().content_type("text/yaml").body(yaml))
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
