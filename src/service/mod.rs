pub mod analysis;
pub mod extraction;
pub mod llm;
pub mod store;

pub use analysis::AnalysisService;
pub use llm::OpenAiClient;
pub use store::ResultStore;
