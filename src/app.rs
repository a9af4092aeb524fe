//! Application state and service initialization
//!
//! This module centralizes service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::sync::Arc;

use actix_web::web;

use crate::model::Config;
use crate::model::config::UploadConfig;
use crate::service::{AnalysisService, OpenAiClient, ResultStore};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Contract analysis pipeline
    pub analysis_service: web::Data<AnalysisService>,
    /// Completed analyses, fetchable by id
    pub store: web::Data<ResultStore>,
    /// Upload limits and scratch directory
    pub uploads: web::Data<UploadConfig>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// Requires OPENAI_API_KEY and a usable upload directory.
    pub fn new(config: Config) -> Result<Self, AppError> {
        if config.llm.api_key.is_none() {
            return Err(AppError::MissingConfig("OPENAI_API_KEY"));
        }

        let llm_client = OpenAiClient::from_config(&config.llm).map_err(AppError::InvalidConfig)?;

        let upload_dir = config.upload.upload_dir();
        std::fs::create_dir_all(&upload_dir).map_err(|e| {
            AppError::UploadDir(format!("{}: {}", upload_dir.display(), e))
        })?;
        tracing::info!(path = %upload_dir.display(), max_bytes = config.upload.max_bytes, "Upload directory ready");

        let analysis_service =
            AnalysisService::new(Arc::new(llm_client), config.llm.model, &config.analysis);

        Ok(Self {
            analysis_service: web::Data::new(analysis_service),
            store: web::Data::new(ResultStore::new(&config.store)),
            uploads: web::Data::new(config.upload),
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Upload directory cannot be created
    #[error("Upload directory unavailable: {0}")]
    UploadDir(String),
}
