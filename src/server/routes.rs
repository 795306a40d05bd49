//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::analysis::{CompanyAnalysis, CvSummary};
use crate::assistant::SUGGESTED_PROMPTS;
use crate::scraping::LinkedInProfile;
use crate::transcription::{AudioClip, TranscriptionError, UNINTELLIGIBLE_AUDIO};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/healthz", get(health_check))
        .route("/health", get(health_check))
        .route("/api/config", get(ui_config))
        .route("/process_prompt", post(process_prompt))
        .route("/process_audio", post(process_audio))
        .route("/analyze_company", post(analyze_company))
        .route("/summarize_cv", post(summarize_cv))
        .route("/linkedin/parse", post(parse_linkedin))
        .route("/linkedin/scrape", post(scrape_linkedin))
        .fallback_service(static_dir)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Model identifier.
    pub model: String,
    /// Whether a model credential is configured.
    pub llm: bool,
    /// Whether voice prompts are accepted.
    pub whisper: bool,
    /// Whether company analyses are produced by the model.
    pub company_analyzer: bool,
    /// Crate version.
    pub version: String,
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.client.model().to_string(),
        llm: state.client.is_available(),
        whisper: state.speech.is_some(),
        company_analyzer: state.company.is_available(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Settings the web UI needs.
#[derive(Debug, Serialize, Deserialize)]
pub struct UiConfig {
    /// Model identifier.
    pub model: String,
    /// Whether the microphone button is enabled.
    pub has_whisper: bool,
    /// Suggested prompts.
    pub prompts: Vec<String>,
}

async fn ui_config(State(state): State<Arc<AppState>>) -> Json<UiConfig> {
    Json(UiConfig {
        model: state.client.model().to_string(),
        has_whisper: state.speech.is_some(),
        prompts: SUGGESTED_PROMPTS.iter().map(|p| (*p).to_string()).collect(),
    })
}

/// Text prompt request.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    /// User prompt.
    pub prompt: String,
}

/// Text prompt response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PromptResponse {
    /// Prompt as received.
    pub prompt: String,
    /// Assistant reply.
    pub response_text: String,
}

async fn process_prompt(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PromptRequest>,
) -> Json<PromptResponse> {
    let response_text = state.assistant.reply(&request.prompt).await;
    Json(PromptResponse {
        prompt: request.prompt,
        response_text,
    })
}

/// Voice prompt response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioResponse {
    /// Transcript.
    pub user_text: String,
    /// Assistant reply.
    pub response_text: String,
}

async fn process_audio(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AudioResponse>, (StatusCode, String)> {
    let Some(speech) = &state.speech else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            TranscriptionError::Unavailable.to_string(),
        ));
    };

    let mut clip = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(String::from);
        let file_name = field.file_name().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid upload: {e}")))?;
        clip = Some(AudioClip::new(
            bytes.to_vec(),
            content_type.as_deref(),
            file_name.as_deref(),
        ));
        break;
    }

    let Some(clip) = clip else {
        return Err((StatusCode::BAD_REQUEST, "no file received".to_string()));
    };

    let user_text = match speech.transcribe(clip).await {
        Ok(text) => text,
        Err(TranscriptionError::EmptyAudio) => {
            return Err((StatusCode::BAD_REQUEST, "empty file".to_string()));
        }
        Err(err) => {
            warn!(error = %err, "transcription failed");
            return Err((StatusCode::UNPROCESSABLE_ENTITY, err.to_string()));
        }
    };

    if user_text.is_empty() {
        return Ok(Json(AudioResponse {
            user_text,
            response_text: UNINTELLIGIBLE_AUDIO.to_string(),
        }));
    }

    let response_text = state.assistant.reply(&user_text).await;
    Ok(Json(AudioResponse {
        user_text,
        response_text,
    }))
}

/// Company analysis request.
#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    /// Website URL, scheme optional.
    pub url: String,
    /// Word budget.
    pub target_words: Option<usize>,
}

async fn analyze_company(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompanyRequest>,
) -> Response {
    let target_words = request
        .target_words
        .filter(|w| *w > 0)
        .unwrap_or_else(|| state.company.default_target_words());
    info!(url = %request.url, target_words, "company analysis requested");

    let analysis: CompanyAnalysis = state.company.analyze(&request.url, target_words).await;
    let status = if analysis.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(analysis)).into_response()
}

/// CV summary request.
#[derive(Debug, Deserialize)]
pub struct CvRequest {
    /// CV text.
    pub text: String,
    /// Word budget.
    pub target_words: Option<usize>,
}

async fn summarize_cv(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CvRequest>,
) -> Json<CvSummary> {
    let target_words = request
        .target_words
        .filter(|w| *w > 0)
        .unwrap_or_else(|| state.cv.default_target_words());
    Json(
        state
            .cv
            .summarize_text(&request.text, "uploaded CV", target_words)
            .await,
    )
}

/// Pasted LinkedIn text.
#[derive(Debug, Deserialize)]
pub struct LinkedInTextRequest {
    /// Profile text.
    pub text: String,
}

async fn parse_linkedin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LinkedInTextRequest>,
) -> Json<LinkedInProfile> {
    Json(state.linkedin_parser.parse(&request.text))
}

/// LinkedIn profile URL.
#[derive(Debug, Deserialize)]
pub struct LinkedInUrlRequest {
    /// Profile URL.
    pub url: String,
}

async fn scrape_linkedin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LinkedInUrlRequest>,
) -> Json<LinkedInProfile> {
    Json(state.linkedin.scrape_or_error(&request.url).await)
}
