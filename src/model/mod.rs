pub mod analysis;
pub mod config;
pub mod document;
pub mod extracted;

pub use analysis::{AnalysisRequest, AnalysisResult, Opportunities, RiskItem, RiskLevel};
pub use config::{Config, SchemaPolicy};
pub use document::{Document, DocumentKind, ExtractedText};
