use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prompt pair sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Fixed rubric and output schema instruction
    pub system: &'static str,
    /// Filename and document text
    pub user: String,
    /// Whether the document text was cut to fit the prompt limit
    pub truncated: bool,
}

/// Risk rating for the whole contract or a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// The analysis itself failed
    Error,
    /// Missing or unrecognized in a leniently accepted reply
    Unknown,
}

impl RiskLevel {
    /// Parse a model-provided label, ignoring case and surrounding whitespace
    ///
    /// Only Low, Medium and High are accepted; `Error` is reserved for
    /// synthesized failure results.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Ordering used to check the High→Low ranking of a breakdown
    pub(crate) fn rank(self) -> u8 {
        match self {
            RiskLevel::High => 3,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 1,
            RiskLevel::Error | RiskLevel::Unknown => 0,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Error => "Error",
            RiskLevel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Opportunities reported by the model: either a count or a short summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Opportunities {
    Count(u64),
    Summary(String),
}

/// One entry of the risk breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RiskItem {
    pub risk_level: RiskLevel,
    pub title: String,
    pub description: String,
}

/// Structured contract analysis handed to the rendering layer
///
/// Always well-formed: failures anywhere in the pipeline are represented as
/// an `Error`-rated result with a single explanatory breakdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResult {
    pub original_filename: String,
    pub overall_risk: RiskLevel,
    pub opportunities_found: Option<Opportunities>,
    pub risk_breakdown: Vec<RiskItem>,
}

impl AnalysisResult {
    /// Build the error-shaped result for a failed analysis
    pub fn failed(
        filename: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            original_filename: filename.into(),
            overall_risk: RiskLevel::Error,
            opportunities_found: Some(Opportunities::Count(0)),
            risk_breakdown: vec![RiskItem {
                risk_level: RiskLevel::Error,
                title: title.into(),
                description: description.into(),
            }],
        }
    }

    pub fn is_error(&self) -> bool {
        self.overall_risk == RiskLevel::Error
    }
}
