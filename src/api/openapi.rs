//! OpenAPI specification endpoints

use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

use crate::api::{analysis, error, health};
use crate::model::{AnalysisResult, Opportunities, RiskItem, RiskLevel};
use crate::service::store::StoredAnalysis;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClauseSpy",
        description = "Contract risk analysis: upload a txt, pdf or docx contract and receive a structured risk breakdown"
    ),
    paths(
        analysis::create_analysis,
        analysis::get_analysis,
        health::liveness,
        health::readiness
    ),
    components(schemas(
        StoredAnalysis,
        AnalysisResult,
        RiskItem,
        RiskLevel,
        Opportunities,
        error::ErrorResponse,
        health::HealthStatus,
        health::ReadinessStatus,
        health::DependencyHealth
    )),
    tags(
        (name = "analyses", description = "Contract risk analysis"),
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
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/v1/analyses"));
        assert!(paths.iter().any(|p| *p == "/v1/analyses/{id}"));
        assert!(paths.iter().any(|p| *p == "/health/ready"));
    }

    #[test]
    fn test_yaml_renders() {
        let yaml = ApiDoc::openapi().to_yaml().unwrap();
        assert!(yaml.contains("ClauseSpy"));
    }
}
