use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{instrument, warn};

use super::dto::{BarcodeForm, HealthResponse, LogResponse, TextForm};
use super::extractors::FormFields;
use super::services::{
    analyze_audio, analyze_barcode, analyze_photo, analyze_text, normalize_barcode,
    vision_media_type,
};
use crate::{error::NutritionError, providers::AudioUpload, state::AppState};

const MEDIA_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/log/text", post(log_text))
        .route("/log/barcode", post(log_barcode))
}

pub fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/log/audio", post(log_audio))
        .route("/log/photo", post(log_photo))
        .layer(DefaultBodyLimit::max(MEDIA_BODY_LIMIT))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

/// POST /log/text (urlencoded or multipart field `text`)
#[instrument(skip(state, form))]
pub async fn log_text(
    State(state): State<AppState>,
    FormFields(form): FormFields<TextForm>,
) -> Result<Json<LogResponse>, NutritionError> {
    if form.text.trim().is_empty() {
        warn!("empty text");
        return Err(NutritionError::InvalidInput("text is required".into()));
    }
    let estimate = analyze_text(&state, &form.text).await?;
    Ok(Json(LogResponse::Estimate(estimate)))
}

/// POST /log/audio (multipart field `audio`)
#[instrument(skip(state, mp))]
pub async fn log_audio(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<Json<LogResponse>, NutritionError> {
    let Some(upload) = read_file(mp, "audio").await? else {
        return Err(NutritionError::InvalidInput("audio is required".into()));
    };
    let audio = AudioUpload {
        body: upload.body,
        filename: upload.filename.unwrap_or_else(|| "audio.m4a".into()),
        content_type: upload
            .content_type
            .unwrap_or_else(|| "application/octet-stream".into()),
    };
    Ok(Json(analyze_audio(&state, audio).await?))
}

/// POST /log/photo (multipart field `photo`)
#[instrument(skip(state, mp))]
pub async fn log_photo(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<Json<LogResponse>, NutritionError> {
    let Some(upload) = read_file(mp, "photo").await? else {
        return Err(NutritionError::InvalidInput("photo is required".into()));
    };
    let media_type = vision_media_type(upload.content_type.as_deref());
    let estimate = analyze_photo(&state, upload.body, media_type).await?;
    Ok(Json(LogResponse::Estimate(estimate)))
}

/// POST /log/barcode (urlencoded or multipart field `barcode`)
#[instrument(skip(state, form))]
pub async fn log_barcode(
    State(state): State<AppState>,
    FormFields(form): FormFields<BarcodeForm>,
) -> Result<Json<LogResponse>, NutritionError> {
    let Some(code) = normalize_barcode(&form.barcode) else {
        warn!(barcode = %form.barcode, "invalid barcode");
        return Err(NutritionError::InvalidInput(
            "barcode must be 4-14 digits".into(),
        ));
    };
    Ok(Json(analyze_barcode(&state, code).await?))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        date: OffsetDateTime::now_utc().date().to_string(),
    })
}

struct UploadedFile {
    body: Bytes,
    filename: Option<String>,
    content_type: Option<String>,
}

/// First part named `name`; other parts are skipped. Stream errors keep their
/// status, so an oversized upload answers 413.
async fn read_file(
    mut mp: Multipart,
    name: &str,
) -> Result<Option<UploadedFile>, NutritionError> {
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }
        let filename = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let body = field.bytes().await?;
        return Ok(Some(UploadedFile {
            body,
            filename,
            content_type,
        }));
    }
    Ok(None)
}
