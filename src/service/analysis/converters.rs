//! Converters from model replies and pipeline failures to analysis results

use crate::model::extracted::{ExtractedAnalysis, ExtractedRiskItem};
use crate::model::{AnalysisResult, RiskItem, RiskLevel, SchemaPolicy};
use crate::service::analysis::error::{AnalysisFailure, ParseError};
use crate::service::analysis::validation::validate_extracted_analysis;

/// Turn the outcome of extraction and invocation into a renderable result
///
/// Never fails: every upstream failure and every unusable reply becomes an
/// `Error`-rated result with one explanatory breakdown entry.
pub fn normalize(
    outcome: Result<String, AnalysisFailure>,
    filename: &str,
    policy: SchemaPolicy,
) -> AnalysisResult {
    let failure = match outcome {
        Ok(raw) => match parse_reply(&raw, filename, policy) {
            Ok(result) => return result,
            Err(e) => AnalysisFailure::from(e),
        },
        Err(failure) => failure,
    };

    tracing::warn!(
        filename = %filename,
        title = failure.title(),
        error = %failure,
        "Analysis produced an error result"
    );

    AnalysisResult::failed(filename, failure.title(), failure.to_string())
}

/// Parse a raw reply and apply the schema policy
fn parse_reply(
    raw: &str,
    filename: &str,
    policy: SchemaPolicy,
) -> Result<AnalysisResult, ParseError> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|e| ParseError(format!("invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ParseError("expected a JSON object".to_string()));
    }

    let extracted: ExtractedAnalysis = serde_json::from_value(value)
        .map_err(|e| ParseError(format!("unexpected field type: {}", e)))?;

    let validation = validate_extracted_analysis(&extracted, filename);

    for warning in &validation.warnings {
        tracing::debug!(filename = %filename, warning = %warning, "Analysis validation warning");
    }

    if !validation.is_valid {
        match policy {
            SchemaPolicy::Strict => {
                return Err(ParseError(format!(
                    "reply does not match the expected schema: {}",
                    validation.errors.join("; ")
                )));
            }
            SchemaPolicy::Lenient => {
                tracing::warn!(
                    filename = %filename,
                    errors = ?validation.errors,
                    "Accepting incomplete analysis under lenient schema policy"
                );
            }
        }
    }

    Ok(convert_analysis(extracted, filename))
}

/// Convert a parsed reply to the domain model, defaulting anything missing
///
/// Under the strict policy nothing is defaulted because validation already
/// rejected incomplete replies.
pub fn convert_analysis(extracted: ExtractedAnalysis, filename: &str) -> AnalysisResult {
    let overall_risk = extracted
        .overall_risk
        .as_deref()
        .and_then(RiskLevel::from_label)
        .unwrap_or(RiskLevel::Unknown);

    let risk_breakdown = extracted
        .risk_breakdown
        .unwrap_or_default()
        .into_iter()
        .map(convert_risk_item)
        .collect();

    AnalysisResult {
        original_filename: filename.to_string(),
        overall_risk,
        opportunities_found: extracted.opportunities_found,
        risk_breakdown,
    }
}

fn convert_risk_item(extracted: ExtractedRiskItem) -> RiskItem {
    RiskItem {
        risk_level: extracted
            .risk_level
            .as_deref()
            .and_then(RiskLevel::from_label)
            .unwrap_or(RiskLevel::Unknown),
        title: extracted.title.unwrap_or_default(),
        description: extracted.description.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Opportunities;
    use crate::service::extraction::ExtractionError;
    use crate::service::llm::InvocationError;

    const WELL_FORMED: &str = r#"{"overall_risk":"High","opportunities_found":2,"risk_breakdown":[{"risk_level":"High","title":"Unlimited Liability","description":"No cap on damages."}]}"#;

    fn assert_error_shape(result: &AnalysisResult, filename: &str) {
        assert_eq!(result.overall_risk, RiskLevel::Error);
        assert_eq!(result.original_filename, filename);
        assert_eq!(result.risk_breakdown.len(), 1);
        assert!(!result.risk_breakdown[0].description.is_empty());
    }

    #[test]
    fn test_well_formed_reply_round_trips() {
        let result = normalize(Ok(WELL_FORMED.to_string()), "msa.pdf", SchemaPolicy::Strict);

        assert_eq!(result.original_filename, "msa.pdf");
        assert_eq!(result.overall_risk, RiskLevel::High);
        assert_eq!(result.opportunities_found, Some(Opportunities::Count(2)));
        assert_eq!(
            result.risk_breakdown,
            vec![RiskItem {
                risk_level: RiskLevel::High,
                title: "Unlimited Liability".to_string(),
                description: "No cap on damages.".to_string(),
            }]
        );
    }

    #[test]
    fn test_every_extraction_failure_is_error_shaped() {
        let failures = [
            ExtractionError::Unsupported("xlsx".to_string()),
            ExtractionError::Encrypted,
            ExtractionError::Empty,
            ExtractionError::ReadError("broken xref".to_string()),
        ];

        for failure in failures {
            let expected_message = failure.to_string();
            let result = normalize(Err(failure.into()), "c.pdf", SchemaPolicy::Strict);
            assert_error_shape(&result, "c.pdf");
            assert_eq!(result.risk_breakdown[0].description, expected_message);
        }
    }

    #[test]
    fn test_extraction_failure_titles() {
        let result = normalize(
            Err(ExtractionError::Empty.into()),
            "scan.pdf",
            SchemaPolicy::Strict,
        );
        assert_eq!(result.risk_breakdown[0].title, "No Text Extracted");

        let result = normalize(
            Err(ExtractionError::Encrypted.into()),
            "locked.pdf",
            SchemaPolicy::Strict,
        );
        assert_eq!(result.risk_breakdown[0].title, "Encrypted Document");
    }

    #[test]
    fn test_invocation_failures_are_error_shaped() {
        let failures = [
            InvocationError::Transport("connection refused".to_string()),
            InvocationError::Service {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            },
        ];

        for failure in failures {
            let result = normalize(Err(failure.into()), "nda.docx", SchemaPolicy::Lenient);
            assert_error_shape(&result, "nda.docx");
            assert_eq!(result.risk_breakdown[0].title, "Analysis Failed");
        }
    }

    #[test]
    fn test_invalid_json_is_error_shaped() {
        for raw in ["{not json", "", "Sure! Here is the analysis:"] {
            for policy in [SchemaPolicy::Strict, SchemaPolicy::Lenient] {
                let result = normalize(Ok(raw.to_string()), "nda.txt", policy);
                assert_error_shape(&result, "nda.txt");
                assert_eq!(result.risk_breakdown[0].title, "Analysis Failed");
            }
        }
    }

    #[test]
    fn test_non_object_json_is_error_shaped() {
        let result = normalize(Ok("[1, 2, 3]".to_string()), "nda.txt", SchemaPolicy::Lenient);
        assert_error_shape(&result, "nda.txt");
        assert!(result.risk_breakdown[0].description.contains("JSON object"));
    }

    #[test]
    fn test_wrong_field_type_is_error_shaped() {
        let raw = r#"{"overall_risk":"Low","opportunities_found":1,"risk_breakdown":"none"}"#;
        let result = normalize(Ok(raw.to_string()), "nda.txt", SchemaPolicy::Lenient);
        assert_error_shape(&result, "nda.txt");
    }

    #[test]
    fn test_strict_policy_rejects_missing_fields() {
        let raw = r#"{"overall_risk":"Medium"}"#;
        let result = normalize(Ok(raw.to_string()), "nda.txt", SchemaPolicy::Strict);

        assert_error_shape(&result, "nda.txt");
        let description = &result.risk_breakdown[0].description;
        assert!(description.contains("opportunities_found"));
        assert!(description.contains("risk_breakdown"));
    }

    #[test]
    fn test_strict_policy_rejects_error_label() {
        let raw = r#"{"overall_risk":"Error","opportunities_found":0,"risk_breakdown":[{"risk_level":"High","title":"Unlimited Liability","description":"No cap on damages."}]}"#;
        let result = normalize(Ok(raw.to_string()), "nda.txt", SchemaPolicy::Strict);

        assert_error_shape(&result, "nda.txt");
        assert_eq!(result.risk_breakdown[0].title, "Analysis Failed");
        assert!(result.risk_breakdown[0].description.contains("'Error'"));
    }

    #[test]
    fn test_lenient_policy_passes_missing_fields_through() {
        let raw = r#"{"overall_risk":"medium","risk_breakdown":[{"title":"Auto-renewal"}]}"#;
        let result = normalize(Ok(raw.to_string()), "nda.txt", SchemaPolicy::Lenient);

        assert_eq!(result.overall_risk, RiskLevel::Medium);
        assert_eq!(result.opportunities_found, None);
        assert_eq!(result.risk_breakdown.len(), 1);
        assert_eq!(result.risk_breakdown[0].risk_level, RiskLevel::Unknown);
        assert_eq!(result.risk_breakdown[0].title, "Auto-renewal");
        assert_eq!(result.risk_breakdown[0].description, "");
    }

    #[test]
    fn test_lenient_policy_unknown_overall_risk() {
        let result = normalize(Ok("{}".to_string()), "nda.txt", SchemaPolicy::Lenient);

        assert_eq!(result.overall_risk, RiskLevel::Unknown);
        assert!(result.risk_breakdown.is_empty());
    }

    #[test]
    fn test_opportunity_summary_is_kept() {
        let raw = r#"{"overall_risk":"Low","opportunities_found":"Volume discount after year one","risk_breakdown":[]}"#;
        let result = normalize(Ok(raw.to_string()), "po.txt", SchemaPolicy::Strict);

        assert_eq!(
            result.opportunities_found,
            Some(Opportunities::Summary("Volume discount after year one".to_string()))
        );
    }

    #[test]
    fn test_reply_filename_is_replaced() {
        let raw = r#"{"original_filename":"hallucinated.pdf","overall_risk":"Low","opportunities_found":0,"risk_breakdown":[]}"#;
        let result = normalize(Ok(raw.to_string()), "real.pdf", SchemaPolicy::Strict);

        assert_eq!(result.original_filename, "real.pdf");
        assert_eq!(result.overall_risk, RiskLevel::Low);
    }
}
