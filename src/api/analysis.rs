//! REST API endpoints for contract analyses

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use actix_web::{HttpResponse, get, post, web};
use regex::Regex;
use serde::Deserialize;
use tempfile::NamedTempFile;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::model::config::UploadConfig;
use crate::service::store::StoredAnalysis;
use crate::service::{AnalysisService, ResultStore};

const FALLBACK_STEM: &str = "document";

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename pattern"));

/// Query parameters for submitting a document
#[derive(Debug, Deserialize, IntoParams)]
pub struct AnalyzeParams {
    /// Original filename; its extension selects the text reader (txt, pdf, doc, docx)
    pub filename: Option<String>,
}

/// Analyze an uploaded contract
///
/// The request body is the raw file. Every analyzed upload yields a result;
/// documents that cannot be read or analyzed come back with
/// `overall_risk = "Error"` and one explanatory breakdown entry.
#[utoipa::path(
    post,
    path = "/v1/analyses",
    params(AnalyzeParams),
    request_body(
        content = Vec<u8>,
        content_type = "application/octet-stream",
        description = "Raw bytes of the contract document"
    ),
    responses(
        (status = 200, description = "Document analyzed", body = StoredAnalysis),
        (status = 400, description = "Missing filename or empty upload", body = crate::api::error::ErrorResponse),
        (status = 413, description = "Upload exceeds the configured size limit"),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorResponse)
    ),
    tag = "analyses"
)]
#[post("/v1/analyses")]
pub async fn create_analysis(
    service: web::Data<AnalysisService>,
    store: web::Data<ResultStore>,
    uploads: web::Data<UploadConfig>,
    query: web::Query<AnalyzeParams>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let filename = query
        .filename
        .as_deref()
        .and_then(sanitize_filename)
        .ok_or_else(|| ApiError::BadRequest("a usable 'filename' query parameter is required".to_string()))?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }

    tracing::info!(filename = %filename, size = body.len(), "Received document for analysis");

    let upload_dir = uploads.upload_dir();
    let upload_name = filename.clone();
    let upload = web::block(move || persist_upload(&upload_dir, &upload_name, &body)).await??;

    let result = service.analyze(&filename, upload.path()).await;

    // Scoped upload file is removed as soon as the analysis is done
    if let Err(e) = upload.close() {
        tracing::warn!(filename = %filename, error = %e, "Failed to remove upload file");
    }

    let stored = store.insert(result).await;

    Ok(HttpResponse::Ok().json(stored))
}

/// Fetch a previously completed analysis
#[utoipa::path(
    get,
    path = "/v1/analyses/{id}",
    params(
        ("id" = Uuid, Path, description = "Analysis ID returned on submission")
    ),
    responses(
        (status = 200, description = "Analysis found", body = StoredAnalysis),
        (status = 404, description = "Analysis not found or expired", body = crate::api::error::ErrorResponse)
    ),
    tag = "analyses"
)]
#[get("/v1/analyses/{id}")]
pub async fn get_analysis(
    store: web::Data<ResultStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    match store.get(&id).await {
        Some(stored) => Ok(HttpResponse::Ok().json(stored)),
        None => Err(ApiError::AnalysisNotFound(id.to_string())),
    }
}

/// Reduce a client-supplied filename to a safe basename
///
/// Drops any directory part and cleans the stem and extension separately:
/// whitespace runs become `_`, characters outside `[A-Za-z0-9_.-]` are
/// removed and leading/trailing dots and underscores are stripped. A stem
/// that cleans away entirely is replaced so the extension still selects the
/// reader. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (base, None),
    };

    let stem = clean_filename_part(stem);
    let extension = extension
        .map(clean_filename_part)
        .filter(|e| !e.is_empty());

    match (stem.is_empty(), extension) {
        (true, None) => None,
        (true, Some(extension)) => Some(format!("{}.{}", FALLBACK_STEM, extension)),
        (false, None) => Some(stem),
        (false, Some(extension)) => Some(format!("{}.{}", stem, extension)),
    }
}

fn clean_filename_part(part: &str) -> String {
    let joined = part.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Write the upload to a scoped temporary file that keeps the original extension
fn persist_upload(dir: &Path, filename: &str, body: &[u8]) -> std::io::Result<NamedTempFile> {
    let suffix = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    file.write_all(body)?;
    file.flush()?;

    Ok(file)
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_analysis).service(get_analysis);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{AnalysisConfig, StoreConfig};
    use crate::model::{AnalysisRequest, RiskLevel};
    use crate::service::llm::{CompletionBackend, InvocationError};
    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use std::sync::Arc;

    const REPLY: &str = r#"{"overall_risk":"High","opportunities_found":2,"risk_breakdown":[{"risk_level":"High","title":"Unlimited Liability","description":"No cap on damages."}]}"#;

    struct StaticBackend;

    #[async_trait]
    impl CompletionBackend for StaticBackend {
        async fn complete_json(
            &self,
            _request: &AnalysisRequest,
            _model: &str,
        ) -> Result<String, InvocationError> {
            Ok(REPLY.to_string())
        }
    }

    struct Fixture {
        service: web::Data<AnalysisService>,
        store: web::Data<ResultStore>,
        uploads: web::Data<UploadConfig>,
        dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        Fixture {
            service: web::Data::new(AnalysisService::new(
                Arc::new(StaticBackend),
                "test-model",
                &AnalysisConfig::default(),
            )),
            store: web::Data::new(ResultStore::new(&StoreConfig::default())),
            uploads: web::Data::new(UploadConfig {
                max_bytes: 1024 * 1024,
                dir: Some(dir.path().to_path_buf()),
            }),
            dir,
        }
    }

    #[actix_web::test]
    async fn test_analyze_then_fetch() {
        let fx = fixture();
        let app = test::init_service(
            App::new()
                .app_data(fx.service.clone())
                .app_data(fx.store.clone())
                .app_data(fx.uploads.clone())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyses?filename=Master%20Agreement.txt")
            .set_payload("Liability: unlimited.")
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(created["result"]["original_filename"], "Master_Agreement.txt");
        assert_eq!(created["result"]["overall_risk"], "High");
        assert_eq!(created["result"]["opportunities_found"], 2);
        assert_eq!(
            created["result"]["risk_breakdown"][0]["title"],
            "Unlimited Liability"
        );

        // Upload file is gone once the response is produced
        assert_eq!(std::fs::read_dir(fx.dir.path()).unwrap().count(), 0);

        let id = created["id"].as_str().unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/v1/analyses/{}", id))
            .to_request();
        let fetched: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn test_unsupported_upload_returns_error_result() {
        let fx = fixture();
        let app = test::init_service(
            App::new()
                .app_data(fx.service.clone())
                .app_data(fx.store.clone())
                .app_data(fx.uploads.clone())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyses?filename=photo.png")
            .set_payload(vec![0x89, 0x50, 0x4e, 0x47])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["result"]["overall_risk"], RiskLevel::Error.to_string());
        assert_eq!(
            body["result"]["risk_breakdown"][0]["title"],
            "Unsupported File Type"
        );
    }

    #[actix_web::test]
    async fn test_missing_filename_is_bad_request() {
        let fx = fixture();
        let app = test::init_service(
            App::new()
                .app_data(fx.service.clone())
                .app_data(fx.store.clone())
                .app_data(fx.uploads.clone())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyses")
            .set_payload("text")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/v1/analyses?filename=empty.txt")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_rejected() {
        let fx = fixture();
        let app = test::init_service(
            App::new()
                .app_data(web::PayloadConfig::new(16))
                .app_data(fx.service.clone())
                .app_data(fx.store.clone())
                .app_data(fx.uploads.clone())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/analyses?filename=big.txt")
            .set_payload(vec![b'a'; 17])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        assert_eq!(std::fs::read_dir(fx.dir.path()).unwrap().count(), 0);
        assert_eq!(fx.store.len().await, 0);
    }

    #[actix_web::test]
    async fn test_unknown_analysis_is_not_found() {
        let fx = fixture();
        let app = test::init_service(
            App::new()
                .app_data(fx.store.clone())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/v1/analyses/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
