//! HTTP API
//!
//! - POST /fillform   - Fill and flatten a template PDF from a form mapping
//! - POST /multistamp - Stamp one base64 PDF onto every page of another
//! - GET /healthcheck - Liveness probe, returns `ok`
//! - GET /version     - Build version string

use crate::error::Error;
use crate::fdf::{CheckboxLexicon, Form};
use crate::ops::{self, Context};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

// ============================================================================
// AppState
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<Context>,
    pub version: String,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(ctx: Context, version: impl Into<String>, body_limit: usize) -> Self {
        Self {
            ctx: Arc::new(ctx),
            version: version.into(),
            body_limit,
        }
    }
}

// ============================================================================
// Error response
// ============================================================================

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        log::error!("[HTTP] {}", self);
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.public_message().to_string()).into_response()
    }
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillFormRequest {
    #[serde(default)]
    pub form: Form,
    pub filename: PathBuf,
    #[serde(default)]
    pub checked_string: String,
    #[serde(default)]
    pub unchecked_string: String,
}

#[derive(Debug, Deserialize)]
pub struct MultistampRequest {
    #[serde(rename = "signaturePDF")]
    pub signature_pdf: String,
    #[serde(rename = "formPDF")]
    pub form_pdf: String,
}

/// Parse a JSON body regardless of Content-Type.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| {
        log::warn!("[HTTP] Rejected body: {}", e);
        Error::invalid_input("invalid input json")
    })
}

/// Standard alphabet with padding. Line breaks and other ASCII whitespace are
/// skipped, so MIME-style payloads wrapped at 76 columns decode.
fn decode_base64(data: &str, what: &'static str) -> Result<Vec<u8>, Error> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64.decode(compact).map_err(|e| {
        log::warn!("[HTTP] Bad base64 in {}: {}", what, e);
        Error::invalid_input(format!("could not decode {} file", what))
    })
}

fn pdf_response(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"out.pdf\""),
        ],
        bytes,
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

// POST /fillform
async fn fillform_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let req: FillFormRequest = parse_json(&body)?;
    let lexicon = CheckboxLexicon::new(req.checked_string, req.unchecked_string);

    let pdf = ops::fill_form(&state.ctx, &req.filename, &req.form, &lexicon).await?;

    log::info!(
        "[POST /fillform] Filled {} fields into {} ({} bytes)",
        req.form.len(),
        req.filename.display(),
        pdf.len()
    );

    Ok(pdf_response(pdf))
}

// POST /multistamp
async fn multistamp_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let req: MultistampRequest = parse_json(&body)?;
    let stamp = decode_base64(&req.signature_pdf, "signature")?;
    let base = decode_base64(&req.form_pdf, "form")?;

    let pdf = ops::multistamp(&state.ctx, &base, &stamp).await?;

    log::info!(
        "[POST /multistamp] Stamped {} bytes onto {} bytes ({} bytes)",
        stamp.len(),
        base.len(),
        pdf.len()
    );

    Ok(pdf_response(pdf))
}

async fn post_only() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "post requests only")
}

// GET /healthcheck
async fn healthcheck_handler() -> &'static str {
    "ok"
}

// GET /version
async fn version_handler(State(state): State<AppState>) -> String {
    state.version.clone()
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .route("/fillform", post(fillform_handler).fallback(post_only))
        .route("/multistamp", post(multistamp_handler).fallback(post_only))
        .route("/healthcheck", get(healthcheck_handler))
        .route("/version", get(version_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
