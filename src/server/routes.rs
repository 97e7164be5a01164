//! Request handlers.

use super::error::ApiError;
use super::state::AppState;
use crate::config::{PageSelection, DEFAULT_CHUNK_SIZE};
use crate::error::TranslatorError;
use crate::output::{Page, TranslatedPage};
use crate::pipeline::extract::extract_document;
use crate::pipeline::input::{has_allowed_extension, resolve_upload_path, secure_filename};
use crate::translate::translate_document;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Name used when sanitising leaves no usable file name.
const FALLBACK_FILENAME: &str = "upload.pdf";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub filepath: String,
    pub total_pages: usize,
    pub pages: Vec<Page>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub page_numbers: Option<Vec<u32>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub translated_pages: Vec<TranslatedPage>,
    /// Number of translated pages, not of pages in the document.
    pub total_pages: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /upload`: store a PDF and return its extracted pages.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(TranslatorError::MissingFile("No selected file".into()).into());
        }
        if !has_allowed_extension(&filename) {
            return Err(TranslatorError::UnsupportedFileType { filename }.into());
        }
        upload = Some((filename, field.bytes().await?));
        break;
    }

    let (original_name, bytes) =
        upload.ok_or_else(|| TranslatorError::MissingFile("No file part in the request".into()))?;

    let filename = secure_filename(&original_name)
        .filter(|name| has_allowed_extension(name))
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

    let upload_dir = &state.server.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|source| TranslatorError::Io {
            path: upload_dir.clone(),
            source,
        })?;
    let path = upload_dir.join(&filename);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| TranslatorError::Io {
            path: path.clone(),
            source,
        })?;
    info!("Stored upload {} ({} bytes)", path.display(), bytes.len());

    let document = extract_document(state.extractor.clone(), &path).await?;

    Ok(Json(UploadResponse {
        success: true,
        filename,
        filepath: path.to_string_lossy().into_owned(),
        total_pages: document.total_pages,
        pages: document.pages,
    }))
}

/// `POST /translate`: translate the selected pages of an uploaded PDF.
pub async fn translate(
    State(state): State<AppState>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(request) = body?;

    let filepath = request
        .filepath
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| TranslatorError::InvalidRequest("No filepath provided".into()))?;
    let path = resolve_upload_path(&state.server.upload_dir, &filepath)?;
    let selection = PageSelection::from_numbers(request.page_numbers);

    let translator = state.translator().await?;
    let translated_pages = translate_document(
        state.extractor.clone(),
        translator,
        &path,
        &selection,
        DEFAULT_CHUNK_SIZE,
    )
    .await?;

    Ok(Json(TranslateResponse {
        success: true,
        total_pages: translated_pages.len(),
        translated_pages,
    }))
}
