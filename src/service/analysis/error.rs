//! Error types for contract analysis

use thiserror::Error;

use crate::service::extraction::ExtractionError;
use crate::service::llm::InvocationError;

/// The model reply could not be turned into an analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Model reply could not be parsed: {0}")]
pub struct ParseError(pub String);

/// Any failure along the analysis pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisFailure {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisFailure {
    /// Title shown on the single breakdown entry of an error result
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisFailure::Extraction(ExtractionError::Unsupported(_)) => "Unsupported File Type",
            AnalysisFailure::Extraction(ExtractionError::Encrypted) => "Encrypted Document",
            AnalysisFailure::Extraction(ExtractionError::Empty) => "No Text Extracted",
            AnalysisFailure::Extraction(ExtractionError::ReadError(_)) => "Text Extraction Failed",
            AnalysisFailure::Invocation(_) | AnalysisFailure::Parse(_) => "Analysis Failed",
        }
    }
}
