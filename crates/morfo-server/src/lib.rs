pub mod handlers;

pub use handlers::{AnalysisView, AnalyzeResponse, AppState, BatchResponse, TokenView, router};
