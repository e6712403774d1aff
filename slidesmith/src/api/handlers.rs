use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, info};

use super::form::GenerateForm;
use super::AppState;
use crate::error::{Result, SlidesmithError};
use crate::llm::Provider;
use crate::render::render;
use crate::storage::TempFile;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const DOWNLOAD_DISPOSITION: &str = r#"attachment; filename="generated_presentation.pptx""#;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
}

/// `GET /health`
pub async fn health() -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /generate`
///
/// Turns `input_text` into an outline with the chosen provider, renders it
/// (onto the uploaded template when one is given) and returns the deck as an
/// attachment. The upload and the rendered file are removed before returning.
/// A body that is not `multipart/form-data` carries none of the required fields.
pub async fn generate(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Generate request is not multipart");
        SlidesmithError::MissingField
    })?;
    let request = GenerateForm::from_multipart(multipart).await?.validate()?;
    let provider: Provider = request.provider.parse()?;

    let template = match &request.template {
        Some(upload) => {
            state
                .workspace
                .save_template(&upload.file_name, &upload.bytes)
                .await?
        }
        None => None,
    };

    let outline = state
        .outlines
        .fetch_outline(
            &request.input_text,
            request.guidance.as_deref(),
            &request.api_key,
            provider,
        )
        .await?;

    let slide_count = outline.slides.len();
    let template_path = template.as_ref().map(|t| t.path().to_path_buf());
    let out_dir = state.workspace.root().to_path_buf();

    let rendered = tokio::task::spawn_blocking(move || {
        render(&outline, template_path.as_deref(), &out_dir).map(TempFile::new)
    })
    .await
    .map_err(|e| SlidesmithError::Internal(format!("Render task failed: {e}")))??;

    let bytes = tokio::fs::read(rendered.path()).await?;

    info!(
        provider = %provider,
        slides = slide_count,
        template = template.is_some(),
        size = bytes.len(),
        "Generated presentation"
    );

    Ok((
        [
            (header::CONTENT_TYPE, PPTX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION),
        ],
        bytes,
    )
        .into_response())
}
