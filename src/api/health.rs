//! Health check endpoints for liveness and readiness probes

use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadinessStatus {
    pub status: String,
    pub version: String,
    /// Analyzer backend serving uploads
    pub analyzer: String,
}

/// Liveness probe endpoint
///
/// Always returns 200 OK if the service is running.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive", body = HealthStatus)
    ),
    tag = "health"
)]
#[get("/health/live")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe endpoint
///
/// The analyzer is built before the server binds, so a running server is ready.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessStatus)
    ),
    tag = "health"
)]
#[get("/health/ready")]
pub async fn readiness(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ReadinessStatus {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        analyzer: state.analyzer.name().to_string(),
    })
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(liveness).service(readiness);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{test, App};

    use super::*;
    use crate::model::{Config, DetectionConfig};
    use crate::oddpub::OddpubAnalyzer;

    #[actix_web::test]
    async fn test_probes() {
        let analyzer = OddpubAnalyzer::new(&DetectionConfig::default()).unwrap();
        let state = web::Data::new(AppState::new(Arc::new(analyzer), Config::default()));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let live: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health/live").to_request()).await;
        assert_eq!(live["status"], "ok");
        assert_eq!(live["version"], env!("CARGO_PKG_VERSION"));

        let ready: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health/ready").to_request()).await;
        assert_eq!(ready["status"], "ready");
        assert_eq!(ready["analyzer"], "oddpub");
    }
}
