//! HTTP surface for headlines, script generation, and audio rendering.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use news_datastore::{DataStore, Episode, Story};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::{
    audio::AudioCombiner,
    cache::{Clock, HeadlineCache, HeadlineSource, HeadlineView},
    llm::agent::generate_scripts,
    search::NewsSearch,
    speech::{chunk_script, SpeechSynthesizer},
    Generator,
};

const SCRIPT_STORY_DELAY: Duration = Duration::from_secs(1);
const AUDIO_CHUNK_DELAY: Duration = Duration::from_millis(500);

/// Shared server state. Cheap to clone; everything is behind an `Arc`.
pub struct AppState<H, C, G, S, T, D>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub cache: Arc<HeadlineCache<H, C>>,
    pub generator: Arc<G>,
    pub search: Arc<S>,
    pub speech: Arc<T>,
    pub combiner: Arc<AudioCombiner>,
    pub store: Arc<D>,
}

impl<H, C, G, S, T, D> Clone for AppState<H, C, G, S, T, D>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            generator: Arc::clone(&self.generator),
            search: Arc::clone(&self.search),
            speech: Arc::clone(&self.speech),
            combiner: Arc::clone(&self.combiner),
            store: Arc::clone(&self.store),
        }
    }
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct HeadlineParams {
    #[serde(default)]
    refresh: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateScriptRequest {
    headlines: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateScriptResponse {
    script: String,
    scripts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateAudioRequest {
    scripts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LatestEpisodeResponse {
    episode: Episode,
    stories: Vec<Story>,
}

/// Builds the API router over `state`.
pub fn router<H, C, G, S, T, D>(state: AppState<H, C, G, S, T, D>) -> Router
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
    S: NewsSearch + Send + Sync + 'static,
    T: SpeechSynthesizer + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
{
    Router::new()
        .route("/headlines", get(get_headlines::<H, C, G, S, T, D>))
        .route(
            "/generate-script",
            post(generate_script::<H, C, G, S, T, D>),
        )
        .route("/generate-audio", post(generate_audio::<H, C, G, S, T, D>))
        .route("/episodes/latest", get(latest_episode::<H, C, G, S, T, D>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until shutdown.
pub async fn serve<H, C, G, S, T, D>(
    addr: &str,
    state: AppState<H, C, G, S, T, D>,
) -> anyhow::Result<()>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
    S: NewsSearch + Send + Sync + 'static,
    T: SpeechSynthesizer + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "API server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn get_headlines<H, C, G, S, T, D>(
    State(state): State<AppState<H, C, G, S, T, D>>,
    Query(params): Query<HeadlineParams>,
) -> Result<Json<HeadlineView>, ApiError>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    let view = if params.refresh {
        state.cache.force_refresh().await.map_err(|e| {
            tracing::error!(error = ?e, "Forced headline refresh failed");
            ApiError::internal("headline refresh failed")
        })?
    } else {
        state.cache.read()
    };
    Ok(Json(view))
}

async fn generate_script<H, C, G, S, T, D>(
    State(state): State<AppState<H, C, G, S, T, D>>,
    Json(request): Json<GenerateScriptRequest>,
) -> Result<Json<GenerateScriptResponse>, ApiError>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    G: Generator + Send + Sync + 'static,
    S: NewsSearch + Send + Sync + 'static,
{
    if request.headlines.is_empty() {
        return Err(ApiError::bad_request("headlines must not be empty"));
    }

    let (scripts, script) = generate_scripts(
        state.generator.as_ref(),
        state.search.as_ref(),
        &request.headlines,
        SCRIPT_STORY_DELAY,
    )
    .await;

    Ok(Json(GenerateScriptResponse { script, scripts }))
}

async fn generate_audio<H, C, G, S, T, D>(
    State(state): State<AppState<H, C, G, S, T, D>>,
    Json(request): Json<GenerateAudioRequest>,
) -> Result<Response, ApiError>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    T: SpeechSynthesizer + Send + Sync + 'static,
{
    if request.scripts.is_empty() {
        return Err(ApiError::bad_request("scripts must not be empty"));
    }

    let chunks: Vec<String> = request
        .scripts
        .iter()
        .flat_map(|script| chunk_script(script, T::MAX_INPUT_CHARS))
        .collect();
    if chunks.is_empty() {
        return Err(ApiError::bad_request("scripts contained no speakable text"));
    }

    let mut segments = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let audio = state.speech.synthesize(chunk).await.map_err(|e| {
            tracing::error!(error = ?e, "Audio synthesis failed");
            ApiError::internal("audio synthesis failed")
        })?;
        segments.push(audio);

        if i + 1 < chunks.len() {
            tokio::time::sleep(AUDIO_CHUNK_DELAY).await;
        }
    }

    let combined = state.combiner.combine(&segments).await.map_err(|e| {
        tracing::error!(error = ?e, "Audio combining failed");
        ApiError::internal("audio combining failed")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"podcast.mp3\"",
            ),
        ],
        combined,
    )
        .into_response())
}

async fn latest_episode<H, C, G, S, T, D>(
    State(state): State<AppState<H, C, G, S, T, D>>,
) -> Result<Json<LatestEpisodeResponse>, ApiError>
where
    H: HeadlineSource + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
    D: DataStore + Send + Sync + 'static,
{
    let episode = state
        .store
        .latest_episode()
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to load latest episode");
            ApiError::internal("failed to load latest episode")
        })?
        .ok_or_else(|| ApiError::not_found("no episodes yet"))?;

    let stories = state.store.episode_stories(episode.id).await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to load episode stories");
        ApiError::internal("failed to load episode stories")
    })?;

    Ok(Json(LatestEpisodeResponse { episode, stories }))
}
