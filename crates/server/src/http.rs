//! HTTP front end.
//!
//! A single `GET /` endpoint takes the `path` query parameter and hands it to
//! the [`RequestOrchestrator`]. Pages are rendered as HTML; media and archives
//! are streamed through `tower-http`'s [`ServeFile`], which also answers
//! `Range` requests so videos can seek.

use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawQuery, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use browse::{BrowseError, Disposition, Outcome, RequestOrchestrator, StreamTarget};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::render::render_page;

/// Name of the only query parameter the browse endpoint reads.
const PATH_PARAM: &str = "path";

/// First `path` value of a raw query string.
///
/// Other parameters are ignored, as are repeated `path` pairs after the first.
/// Absent or empty means the root.
pub fn path_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == PATH_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Errors surfaced to HTTP clients.
///
/// Responses carry a short plain-text message only; details stay in the logs.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Browse(#[from] BrowseError),

    /// The blocking worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(#[from] JoinError),
}

impl HttpError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Browse(BrowseError::PermissionDenied) => StatusCode::FORBIDDEN,
            HttpError::Browse(BrowseError::NotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            HttpError::Browse(BrowseError::PermissionDenied) => "Access denied",
            HttpError::Browse(BrowseError::NotFound) => "Not found",
            HttpError::Browse(BrowseError::ReadDir(_)) => "Error reading directory",
            HttpError::Browse(BrowseError::ReadFile(_)) => "Could not read file",
            HttpError::Browse(BrowseError::Stat(_)) | HttpError::Worker(_) => {
                "Internal server error"
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, self.message()).into_response()
    }
}

/// Build the application router.
pub fn router(orchestrator: Arc<RequestOrchestrator>) -> Router {
    Router::new()
        .route("/", get(browse_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

/// Serve the router on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    orchestrator: Arc<RequestOrchestrator>,
    shutdown: CancellationToken,
) -> io::Result<()> {
    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Shutdown requested, draining connections");
        })
        .await
}

async fn browse_handler(
    State(orchestrator): State<Arc<RequestOrchestrator>>,
    RawQuery(query): RawQuery,
    request: Request,
) -> Result<Response, HttpError> {
    let path = path_param(query.as_deref());

    // Filesystem access is blocking.
    let outcome =
        tokio::task::spawn_blocking(move || orchestrator.handle(path.as_deref())).await??;

    match outcome {
        Outcome::Page(view) => Ok(Html(render_page(&view).into_string()).into_response()),
        Outcome::Stream(target) => Ok(stream_file(target, request).await),
    }
}

/// Stream a file with headers for its disposition.
async fn stream_file(target: StreamTarget, request: Request) -> Response {
    debug!(file = %target.file_name, disposition = ?target.disposition, "Streaming file");

    let mut response = match ServeFile::new(&target.path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };

    if !response.status().is_success() {
        return response;
    }

    let headers = response.headers_mut();
    if let Some(content_type) = target.category.content_type() {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(target.disposition, &target.file_name),
    );

    response
}

/// Build a `Content-Disposition` value, replacing characters that cannot
/// appear in a quoted header parameter.
fn content_disposition(disposition: Disposition, file_name: &str) -> HeaderValue {
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };

    let safe_name: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    HeaderValue::from_str(&format!("{}; filename=\"{}\"", kind, safe_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
