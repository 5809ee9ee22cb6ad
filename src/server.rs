//! HTTP server for notes, PDF context, chat and question generation.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/api/notes` | List all notes in insertion order |
//! | `POST`   | `/api/notes` | Create a note (`201`) |
//! | `PUT`    | `/api/notes/{id}` | Update a note (`404` if unknown) |
//! | `DELETE` | `/api/notes/{id}` | Delete a note (`204`, `404` if unknown) |
//! | `POST`   | `/upload-pdf` | Multipart upload, field `pdf`; replaces the document context |
//! | `GET`    | `/document` | Describe the current document |
//! | `DELETE` | `/document` | Clear the current document |
//! | `POST`   | `/chat` | Ask the assistant, with the document as context |
//! | `POST`   | `/generate-questions` | Audience-targeted questions about the document |
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/chat`, fallback | UI pages, when `server.static_dir` is set |
//!
//! # Error Contract
//!
//! ```json
//! { "error": "Note not found" }
//! ```
//!
//! Internal failures (including handler panics) carry diagnostics:
//!
//! ```json
//! { "error": "Internal server error", "details": "...", "path": "/api/notes", "method": "GET" }
//! ```
//!
//! Failures of the completion API or PDF parser surface only a generic
//! message; the cause is logged.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, get_service, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::chat;
use crate::config::Config;
use crate::document::{DocumentContext, DocumentStatus};
use crate::extract::is_pdf_content_type;
use crate::ingest::{ingest_pdf, UploadSpool};
use crate::llm::{create_client, CompletionClient};
use crate::models::{NewNote, Note, NoteUpdate};
use crate::questions::{self, QuestionError};
use crate::store::memory::InMemoryNoteStore;
use crate::store::{NoteStore, StoreError};

/// Multipart field carrying the uploaded PDF.
pub const PDF_FIELD: &str = "pdf";

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Note storage; in-memory, insertion-ordered.
    pub notes: Arc<dyn NoteStore>,
    /// The single process-wide document that chat and questions read from.
    pub documents: Arc<DocumentContext>,
    /// Completion client used by `/chat` and `/generate-questions`.
    pub llm: Arc<dyn CompletionClient>,
    /// Directory receiving upload spool files.
    pub upload_dir: Arc<PathBuf>,
}

impl AppState {
    /// Fresh state with an empty in-memory store and no document.
    pub fn new(config: &Config, llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            notes: Arc::new(InMemoryNoteStore::new()),
            documents: Arc::new(DocumentContext::new()),
            llm,
            upload_dir: Arc::new(config.upload.dir.clone()),
        }
    }
}

/// Starts the HTTP server and runs until the process is terminated.
///
/// Creates the upload directory, builds the completion client named by
/// `[llm].provider`, and binds to `[server].bind`.
///
/// # Arguments
///
/// * `config` - Loaded configuration; `PORT` and the API key are already
///   resolved by [`crate::config::load_config`].
///
/// # Returns
///
/// Returns `Ok(())` only when the server shuts down. Fails if the upload
/// directory cannot be created, the completion client cannot be built,
/// or the bind address is unavailable.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.upload.dir)?;

    let llm: Arc<dyn CompletionClient> = Arc::from(create_client(&config.llm)?);
    if !config.llm.is_enabled() {
        tracing::warn!("completion API disabled; /chat and /generate-questions will fail");
    }

    let state = AppState::new(config, llm);
    let app = build_router(state, config);

    let bind_addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(
        model = %config.llm.model,
        upload_dir = %config.upload.dir.display(),
        "server running at http://{}",
        bind_addr
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router with all routes and middleware.
///
/// When `[server].static_dir` is set, `GET /chat` serves `chat.html` and
/// any unmatched path is served from the directory, falling back to
/// `index.html`. Otherwise unmatched paths get a JSON 404.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let mut app = Router::new()
        .route("/api/notes", get(handle_list_notes).post(handle_create_note))
        .route(
            "/api/notes/{id}",
            put(handle_update_note).delete(handle_delete_note),
        )
        .route(
            "/upload-pdf",
            post(handle_upload_pdf).layer(DefaultBodyLimit::max(config.upload.max_bytes)),
        )
        .route(
            "/document",
            get(handle_document_status).delete(handle_clear_document),
        )
        .route("/generate-questions", post(handle_generate_questions))
        .route("/health", get(handle_health));

    app = match &config.server.static_dir {
        Some(dir) => app
            .route(
                "/chat",
                get_service(ServeFile::new(dir.join("chat.html"))).post(handle_chat),
            )
            .fallback_service(ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))),
        None => app
            .route("/chat", post(handle_chat))
            .fallback(handle_not_found),
    };

    app.with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(annotate_internal_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============ Error response ============

/// JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
}

/// Marks a response as an internal failure so the outer middleware can
/// attach the request path and method.
#[derive(Clone)]
struct InternalFailure {
    details: String,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let internal = self.details.clone().map(|details| InternalFailure { details });
        let body = ErrorBody {
            error: self.message,
            details: self.details,
            path: None,
            method: None,
        };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(marker) = internal {
            response.extensions_mut().insert(marker);
        }
        response
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, message)
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, message)
}

/// Constructs a 500 for a failed dependency; `message` is all the client sees.
fn service_error(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Constructs a 500 for an unexpected failure, with diagnostics.
fn internal(details: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Internal server error".to_string(),
        details: Some(details.into()),
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                tracing::debug!(%id, "note not found");
                not_found("Note not found")
            }
        }
    }
}

/// Converts a handler panic into an internal error response.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(%details, "handler panicked");
    internal(details).into_response()
}

/// Rewrites internal-failure responses to echo the request path and method.
async fn annotate_internal_errors(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let Some(failure) = response.extensions().get::<InternalFailure>().cloned() else {
        return response;
    };
    tracing::error!(%method, %path, details = %failure.details, "internal server error");
    let body = ErrorBody {
        error: "Internal server error".to_string(),
        details: Some(failure.details),
        path: Some(path),
        method: Some(method),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Parses an optional JSON body.
///
/// An empty body or `null` yields `T::default()`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| bad_request(format!("Invalid JSON body: {}", e)))
}

async fn handle_not_found() -> AppError {
    not_found("Not found")
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /api/notes ============

async fn handle_list_notes(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state.notes.list().await?;
    tracing::debug!(count = notes.len(), "listing notes");
    Ok(Json(notes))
}

async fn handle_create_note(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let draft: NewNote = parse_body(&body)?;
    let note = state.notes.create(draft).await?;
    tracing::info!(id = %note.id, title = %note.title, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// Empty-string fields keep their current value; see [`Note::apply`].
async fn handle_update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Note>, AppError> {
    let update: NoteUpdate = parse_body(&body)?;
    let note = state.notes.update(&id, update).await?;
    tracing::info!(id = %note.id, "note updated");
    Ok(Json(note))
}

async fn handle_delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.notes.delete(&id).await?;
    tracing::info!(%id, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============ POST /upload-pdf ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    message: String,
    page_count: usize,
    characters: usize,
}

/// Handler for `POST /upload-pdf`.
///
/// Only the `pdf` field is read. Its declared content type is checked
/// before anything is written to disk, so a non-PDF never reaches the
/// extractor. The spooled file is deleted once extraction finishes.
async fn handle_upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| bad_request(e.body_text()))?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_pdf_content_type(&content_type) {
            tracing::warn!(%content_type, "rejected non-PDF upload");
            return Err(bad_request("Only PDF files are allowed"));
        }

        let mut spool = UploadSpool::create(&state.upload_dir)
            .map_err(|e| internal(format!("failed to create upload file: {}", e)))?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::new(e.status(), e.body_text()))?
        {
            spool
                .write_chunk(&chunk)
                .await
                .map_err(|e| internal(format!("failed to write upload file: {}", e)))?;
        }
        tracing::debug!(
            bytes = spool.bytes_written(),
            file_name = field.file_name().unwrap_or(""),
            "upload spooled"
        );

        let summary = ingest_pdf(spool, &state.documents).await.map_err(|e| {
            tracing::error!(error = %e, "error processing PDF");
            service_error("Error processing PDF file")
        })?;

        return Ok(Json(UploadResponse {
            message: "PDF uploaded and processed successfully".to_string(),
            page_count: summary.page_count,
            characters: summary.characters,
        }));
    }

    Err(bad_request("No PDF file uploaded"))
}

// ============ /document ============

async fn handle_document_status(State(state): State<AppState>) -> Json<DocumentStatus> {
    Json(state.documents.status())
}

async fn handle_clear_document(State(state): State<AppState>) -> StatusCode {
    state.documents.clear();
    tracing::info!("document context cleared");
    StatusCode::NO_CONTENT
}

// ============ POST /chat ============

#[derive(Deserialize, Default)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request: ChatRequest = parse_body(&body)?;
    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| bad_request("No message provided"))?;

    let response = chat::ask(state.llm.as_ref(), &state.documents, &message)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "chat completion failed");
            service_error("Something went wrong")
        })?;
    Ok(Json(ChatResponse { response }))
}

// ============ POST /generate-questions ============

#[derive(Deserialize, Default)]
struct QuestionsRequest {
    #[serde(default)]
    audience: Option<String>,
}

#[derive(Serialize)]
struct QuestionsResponse {
    questions: Vec<String>,
}

async fn handle_generate_questions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QuestionsResponse>, AppError> {
    let request: QuestionsRequest = parse_body(&body)?;
    let questions = questions::generate_questions(
        state.llm.as_ref(),
        &state.documents,
        request.audience.as_deref(),
    )
    .await
    .map_err(|e| match e {
        QuestionError::NoDocument | QuestionError::MissingAudience => bad_request(e.to_string()),
        QuestionError::Llm(err) => {
            tracing::error!(error = %err, "question generation failed");
            service_error("Error generating questions")
        }
    })?;
    Ok(Json(QuestionsResponse { questions }))
}
