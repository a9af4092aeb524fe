use serde::Deserialize;

use crate::model::Opportunities;

/// Contract analysis as returned by the model, before validation
///
/// Every field is optional so that a reply missing fields still parses;
/// whether that is acceptable is decided by the schema policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedAnalysis {
    #[serde(default)]
    pub original_filename: Option<String>,

    #[serde(default)]
    pub overall_risk: Option<String>,

    #[serde(default)]
    pub opportunities_found: Option<Opportunities>,

    #[serde(default)]
    pub risk_breakdown: Option<Vec<ExtractedRiskItem>>,
}

/// Single risk entry as returned by the model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedRiskItem {
    #[serde(default)]
    pub risk_level: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}
