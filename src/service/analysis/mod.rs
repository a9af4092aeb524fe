//! Contract risk analysis service
//!
//! Runs the pipeline for one uploaded document: extract text, build the
//! prompt, call the completion service, normalize the reply. Every path ends
//! in a renderable [`AnalysisResult`].

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::model::config::AnalysisConfig;
use crate::model::{AnalysisResult, Document, ExtractedText, SchemaPolicy};
use crate::service::analysis::converters::normalize;
use crate::service::analysis::prompts::build_analysis_request;
use crate::service::extraction::{self, ExtractionError};
use crate::service::llm::CompletionBackend;

pub mod converters;
pub mod error;
pub mod prompts;
pub mod validation;

pub use error::AnalysisFailure;

/// Service for analyzing uploaded contracts
pub struct AnalysisService {
    backend: Arc<dyn CompletionBackend>,
    model: String,
    schema_policy: SchemaPolicy,
    max_document_chars: usize,
}

impl AnalysisService {
    /// Creates a new analysis service around a completion backend
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        model: impl Into<String>,
        config: &AnalysisConfig,
    ) -> Self {
        let model = model.into();

        tracing::info!(
            model = %model,
            schema_policy = ?config.schema_policy,
            max_document_chars = config.max_document_chars,
            "Contract analysis service initialized"
        );

        Self {
            backend,
            model,
            schema_policy: config.schema_policy,
            max_document_chars: config.max_document_chars,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Analyze the file at `path`, uploaded as `filename`
    ///
    /// The caller owns the file and removes it afterwards.
    pub async fn analyze(&self, filename: &str, path: &Path) -> AnalysisResult {
        let start_time = Instant::now();

        let outcome = self.run(filename, path).await;
        let result = normalize(outcome, filename, self.schema_policy);

        if result.is_error() {
            tracing::warn!(
                filename = %filename,
                reason = result
                    .risk_breakdown
                    .first()
                    .map(|item| item.title.as_str())
                    .unwrap_or_default(),
                elapsed_ms = start_time.elapsed().as_millis(),
                "Contract analysis produced an error result"
            );
            return result;
        }

        tracing::info!(
            filename = %filename,
            overall_risk = %result.overall_risk,
            risks = result.risk_breakdown.len(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Contract analysis finished"
        );

        result
    }

    /// Extraction, prompting and invocation; the raw reply or the first failure
    async fn run(&self, filename: &str, path: &Path) -> Result<String, AnalysisFailure> {
        let document = Document::new(filename, path)?;
        let text = extract_blocking(&document).await?;

        let request = build_analysis_request(&document.filename, &text, self.max_document_chars);
        if request.truncated {
            tracing::warn!(
                filename = %filename,
                chars = text.char_count(),
                limit = self.max_document_chars,
                "Document text truncated to fit the prompt"
            );
        }

        let start_time = Instant::now();

        tracing::debug!(
            filename = %filename,
            model = %self.model,
            prompt_length = request.user.len(),
            "Initiating completion call for contract analysis"
        );

        match self.backend.complete_json(&request, &self.model).await {
            Ok(reply) => {
                tracing::info!(
                    filename = %filename,
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    reply_length = reply.len(),
                    "Completion call for contract analysis completed successfully"
                );
                Ok(reply)
            }
            Err(e) => {
                tracing::error!(
                    filename = %filename,
                    model = %self.model,
                    elapsed_ms = start_time.elapsed().as_millis(),
                    error = %e,
                    "Completion call for contract analysis failed"
                );
                Err(e.into())
            }
        }
    }
}

/// Run text extraction on the blocking pool
async fn extract_blocking(document: &Document) -> Result<ExtractedText, ExtractionError> {
    let path = document.path.clone();
    let kind = document.kind;

    tokio::task::spawn_blocking(move || extraction::extract(&path, kind))
        .await
        .unwrap_or_else(|e| {
            Err(ExtractionError::ReadError(format!(
                "Extraction task failed: {}",
                e
            )))
        })
}
