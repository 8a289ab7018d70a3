use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use morfo_affix::SuffixAnalyzer;
use morfo_lexicon::Lexicon;
use morfo_types::{Analysis, Word};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SuffixAnalyzer>,
    pub lexicon: Arc<Lexicon>,
    pub max_forms: usize,
    pub disable_cache: bool,
}

impl AppState {
    fn analyze(&self, form: &str) -> AnalyzeResponse {
        let mut word = Word::new(form);
        self.analyzer.annotate(&mut word, self.lexicon.as_ref());
        debug!("{} -> {} analyses", form, word.n_analyses());
        AnalyzeResponse::from(&word)
    }
}

#[derive(Deserialize)]
pub struct AnalyzeQuery {
    pub form: Option<String>,
}

#[derive(Deserialize)]
pub struct BatchQuery {
    pub forms: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub form: String,
    pub found_in_dict: bool,
    pub analyses: Vec<AnalysisView>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub lemma: String,
    pub tag: String,
    pub retokenization: Vec<TokenView>,
}

/// One word of a retokenization.
#[derive(Debug, Serialize)]
pub struct TokenView {
    pub form: String,
    pub analyses: Vec<AnalysisView>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub items: Vec<AnalyzeResponse>,
}

impl From<&Analysis> for AnalysisView {
    fn from(a: &Analysis) -> Self {
        Self {
            lemma: a.lemma.clone(),
            tag: a.tag.clone(),
            retokenization: a
                .retokenization
                .iter()
                .map(|w| TokenView {
                    form: w.form().to_string(),
                    analyses: w.analyses().iter().map(AnalysisView::from).collect(),
                })
                .collect(),
        }
    }
}

impl From<&Word> for AnalyzeResponse {
    fn from(word: &Word) -> Self {
        Self {
            form: word.form().to_string(),
            found_in_dict: word.is_found_in_dict(),
            analyses: word.analyses().iter().map(AnalysisView::from).collect(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/analyze", get(analyze))
        .route("/v1/analyze/batch", get(analyze_batch))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeQuery>,
) -> Result<Response, ApiError> {
    let form = params.form.as_deref().map(str::trim).unwrap_or_default();
    if form.is_empty() {
        return Err(ApiError::bad_request("form is required"));
    }
    if form.split_whitespace().nth(1).is_some() {
        return Err(ApiError::bad_request("form must be a single word"));
    }

    let response = state.analyze(form);
    Ok(cacheable(state.disable_cache, Json(response)))
}

async fn analyze_batch(
    State(state): State<AppState>,
    Query(params): Query<BatchQuery>,
) -> Result<Response, ApiError> {
    let forms: Vec<&str> = params
        .forms
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if forms.is_empty() {
        return Err(ApiError::bad_request("forms is required"));
    }
    if forms.len() > state.max_forms {
        debug!(
            "batch of {} forms capped at {}",
            forms.len(),
            state.max_forms
        );
    }

    let items = forms
        .into_iter()
        .take(state.max_forms)
        .map(|form| state.analyze(form))
        .collect();
    Ok(cacheable(state.disable_cache, Json(BatchResponse { items })))
}

fn cacheable(disable_cache: bool, body: impl IntoResponse) -> Response {
    if disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(json!({ "error": msg }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
