use std::fmt::Display;
use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use notes_service::{DownloadOutcome, ExportFormat, NotesService};

use crate::page::render_page;

/// Cookie carrying the session handle.
pub const SESSION_COOKIE: &str = "studynotes_session";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(err: impl Display) -> Self {
        log::error!("Request failed: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Internal error: {}", err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

// ---------------------------------------------------------------------------
// Session handle
// ---------------------------------------------------------------------------

/// The caller's session handle, and whether it was just issued.
pub struct Session {
    pub handle: String,
    pub is_new: bool,
}

impl Session {
    /// Read the handle from the `Cookie` header, issuing a fresh one when
    /// it is missing or not a UUID.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok());

        match existing {
            Some(id) => Self {
                handle: id.to_string(),
                is_new: false,
            },
            None => Self {
                handle: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// Add `Set-Cookie` to the response for a newly issued handle.
    pub fn attach(&self, mut response: Response) -> Result<Response, AppError> {
        if self.is_new {
            let cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, self.handle);
            let value = HeaderValue::from_str(&cookie).map_err(AppError::internal)?;
            response.headers_mut().append(SET_COOKIE, value);
        }
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: NotesService) -> Router {
    Router::new()
        .route("/", get(search))
        .route("/search/", get(search))
        .route("/download/{format}/", get(download))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: NotesService, bind: &str, port: u16) -> Result<()> {
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    log::info!("studynotes listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("studynotes shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    topic: String,
}

async fn search(
    State(service): State<NotesService>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let session = Session::from_headers(&headers);
    let outcome = service
        .search(&session.handle, &query.topic)
        .await
        .map_err(AppError::internal)?;

    session.attach(Html(render_page(&outcome)).into_response())
}

async fn download(
    State(service): State<NotesService>,
    headers: HeaderMap,
    Path(format): Path<String>,
) -> Result<Response, AppError> {
    let format = ExportFormat::ALL
        .into_iter()
        .find(|f| f.as_str() == format)
        .ok_or_else(|| AppError::not_found(format!("Unknown download format: {format}")))?;

    let session = Session::from_headers(&headers);
    let response = match service.download(&session.handle, format).map_err(AppError::internal)? {
        DownloadOutcome::File {
            filename,
            content_type,
            bytes,
        } => {
            let disposition = content_disposition(&filename);
            let headers = [
                (CONTENT_TYPE, HeaderValue::from_static(content_type)),
                (
                    CONTENT_DISPOSITION,
                    HeaderValue::from_str(&disposition).map_err(AppError::internal)?,
                ),
            ];
            (headers, bytes).into_response()
        }
        DownloadOutcome::NothingToDownload => Redirect::to("/search/").into_response(),
    };

    session.attach(response)
}

/// `attachment` disposition; names that are not plain ASCII also get an
/// RFC 6266 `filename*` parameter carrying the UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback = ascii_filename(filename);
    if fallback == filename {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    }
}

/// Replace characters that cannot appear in a quoted ASCII header parameter.
fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_control() || c == '"' || c == '\\' || !c.is_ascii() { '_' } else { c })
        .collect()
}
