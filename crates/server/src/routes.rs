use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::store::SessionStore;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sweeper_core::{
    Action, ChartSpec, FileFormat, Outcome, Session, SessionView, SweepResult, UploadedFile,
};
use tokio::task::spawn_blocking;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl()),
            config: Arc::new(config),
        }
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// A session preview with its id.
#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: SessionView,
}

/// Acknowledgement of a cleaning or selection step.
#[derive(Serialize)]
pub struct ActionResponse {
    pub message: String,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ColumnsRequest {
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let name = params
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing file name".to_string()))?;

    let upload = UploadedFile::new(name, body.to_vec());
    let limit = state.config.preview_rows;
    // parsing is CPU-bound; keep it off the async workers
    let (session, view) = spawn_blocking(move || -> SweepResult<_> {
        let session = Session::open(&upload)?;
        let view = session.view(limit)?;
        Ok((session, view))
    })
    .await??;

    let id = state.sessions.insert(session).await;
    tracing::info!("Opened session {id} for {}", view.file.name);

    Ok((StatusCode::CREATED, Json(SessionResponse { id, view })))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewParams>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.sessions.lock(id).await?;
    let limit = params.limit.unwrap_or(state.config.preview_rows);
    let view = spawn_blocking(move || session.view(limit)).await??;
    Ok(Json(SessionResponse { id, view }))
}

async fn discard(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(id))
    }
}

/// Apply `action` on a blocking thread while holding only this session's lock.
async fn apply(state: &AppState, id: Uuid, action: Action) -> ApiResult<Outcome> {
    let mut session = state.sessions.lock(id).await?;
    Ok(spawn_blocking(move || session.apply(action)).await??)
}

async fn apply_with_view(
    state: &AppState,
    id: Uuid,
    action: Action,
) -> ApiResult<Json<ActionResponse>> {
    let mut session = state.sessions.lock(id).await?;
    let limit = state.config.preview_rows;
    let (outcome, view) = spawn_blocking(move || -> SweepResult<_> {
        let outcome = session.apply(action)?;
        Ok((outcome, session.view(limit)?))
    })
    .await??;

    Ok(Json(ActionResponse {
        message: outcome.message(),
        session: SessionResponse { id, view },
    }))
}

async fn remove_duplicates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ActionResponse>> {
    apply_with_view(&state, id, Action::RemoveDuplicates).await
}

async fn fill_missing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ActionResponse>> {
    apply_with_view(&state, id, Action::FillMissing).await
}

async fn select_columns(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ColumnsRequest>,
) -> ApiResult<Json<ActionResponse>> {
    let action = Action::SelectColumns {
        columns: request.columns,
    };
    apply_with_view(&state, id, action).await
}

async fn visualize(state: &AppState, id: Uuid) -> ApiResult<ChartSpec> {
    match apply(state, id, Action::Visualize).await? {
        Outcome::Chart(chart) => Ok(chart),
        other => Err(ApiError::BadRequest(other.message())),
    }
}

async fn chart_html(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Html<String>> {
    Ok(Html(visualize(&state, id).await?.to_html()))
}

async fn chart_json(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ChartSpec>> {
    Ok(Json(visualize(&state, id).await?))
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let format: FileFormat = params.format.as_deref().unwrap_or("csv").parse()?;

    let artifact = match apply(&state, id, Action::Export { format }).await? {
        Outcome::Artifact(artifact) => artifact,
        other => return Err(ApiError::BadRequest(other.message())),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.file_name.replace('"', "_")
    );
    let headers = [
        (header::CONTENT_TYPE, artifact.mime_type.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, artifact.bytes).into_response())
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health))
        .route("/files", post(upload))
        .route("/files/:id", get(show).delete(discard))
        .route("/files/:id/remove-duplicates", post(remove_duplicates))
        .route("/files/:id/fill-missing", post(fill_missing))
        .route("/files/:id/columns", put(select_columns))
        .route("/files/:id/chart", get(chart_html))
        .route("/files/:id/chart.json", get(chart_json))
        .route("/files/:id/export", get(download))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
