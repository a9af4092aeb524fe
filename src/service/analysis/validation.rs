//! Validation logic for LLM-returned contract analyses
//!
//! Checks that a parsed reply carries every field the renderer relies on.

use crate::model::RiskLevel;
use crate::model::extracted::ExtractedAnalysis;

/// Result of analysis validation
#[derive(Debug)]
pub struct AnalysisValidationResult {
    /// Whether the analysis passed validation
    pub is_valid: bool,
    /// Problems that make the reply unusable under the strict policy
    pub errors: Vec<String>,
    /// Quality issues that never reject a reply
    pub warnings: Vec<String>,
}

impl AnalysisValidationResult {
    /// Create a new validation result with no issues
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the validation result
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the validation result
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Validate a parsed analysis for completeness
///
/// Checks:
/// 1. `overall_risk`, `opportunities_found` and `risk_breakdown` are present
/// 2. Every risk level is one of Low, Medium, High
/// 3. Every breakdown entry has a title and a description
/// 4. The breakdown is ranked High to Low (warning only)
/// 5. A Medium/High overall rating comes with at least one entry (warning only)
pub fn validate_extracted_analysis(
    analysis: &ExtractedAnalysis,
    filename: &str,
) -> AnalysisValidationResult {
    let mut result = AnalysisValidationResult::valid();

    let overall = match analysis.overall_risk.as_deref() {
        None => {
            result.add_error("Missing field 'overall_risk'".to_string());
            None
        }
        Some(label) => {
            let level = RiskLevel::from_label(label);
            if level.is_none() {
                result.add_error(format!("Unrecognized overall_risk '{}'", label));
            }
            level
        }
    };

    if analysis.opportunities_found.is_none() {
        result.add_error("Missing field 'opportunities_found'".to_string());
    }

    match &analysis.risk_breakdown {
        None => result.add_error("Missing field 'risk_breakdown'".to_string()),
        Some(items) => {
            let mut previous_rank: Option<u8> = None;

            for (i, item) in items.iter().enumerate() {
                let position = i + 1;

                match item.risk_level.as_deref() {
                    None => result.add_error(format!(
                        "Risk breakdown entry {} is missing 'risk_level'",
                        position
                    )),
                    Some(label) => match RiskLevel::from_label(label) {
                        Some(level) => {
                            let rank = level.rank();
                            if previous_rank.is_some_and(|prev| rank > prev) {
                                result.add_warning(format!(
                                    "Risk breakdown entry {} ({}) is ranked below a lower risk",
                                    position, level
                                ));
                            }
                            previous_rank = Some(rank);
                        }
                        None => result.add_error(format!(
                            "Risk breakdown entry {} has unrecognized risk_level '{}'",
                            position, label
                        )),
                    },
                }

                if item.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
                    result.add_error(format!(
                        "Risk breakdown entry {} is missing 'title'",
                        position
                    ));
                }

                if item
                    .description
                    .as_deref()
                    .is_none_or(|d| d.trim().is_empty())
                {
                    result.add_error(format!(
                        "Risk breakdown entry {} is missing 'description'",
                        position
                    ));
                }
            }

            if items.is_empty() && matches!(overall, Some(RiskLevel::Medium | RiskLevel::High)) {
                result.add_warning(format!(
                    "Overall risk is {} but the risk breakdown is empty",
                    overall.map(|l| l.to_string()).unwrap_or_default()
                ));
            }
        }
    }

    if let Some(reported) = analysis.original_filename.as_deref() {
        if reported != filename {
            result.add_warning(format!(
                "Reply names file '{}' instead of '{}'",
                reported.chars().take(80).collect::<String>(),
                filename
            ));
        }
    }

    result
}
