use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};
use tracing::{info, instrument, warn};

use super::dto::{Confidence, FoodItem, LogResponse, NutritionEstimate, NutritionRecord};
use super::parse::parse_nutrition;
use super::prompts::{
    barcode_fallback_prompt, Modality, PHOTO_INSTRUCTION, SYSTEM_PROMPT, TRANSCRIPTION_ERROR,
    UNKNOWN_PRODUCT_NAME, VERIFIED_NOTE,
};
use crate::error::NutritionError;
use crate::providers::{AnalysisRequest, AudioUpload, Product, UserContent};
use crate::state::AppState;

pub const PRODUCT_DB_SOURCE: &str = "openfoodfacts";
const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Codes go straight into the product database URL path.
pub(crate) fn normalize_barcode(raw: &str) -> Option<&str> {
    lazy_static! {
        static ref BARCODE_RE: Regex = Regex::new(r"^[0-9]{4,14}$").unwrap();
    }
    let code = raw.trim();
    BARCODE_RE.is_match(code).then_some(code)
}

/// Image types the vision model accepts; anything else is sent as JPEG.
pub(crate) fn vision_media_type(ct: Option<&str>) -> &'static str {
    match ct {
        Some("image/jpeg") | Some("image/jpg") => "image/jpeg",
        Some("image/png") => "image/png",
        Some("image/gif") => "image/gif",
        Some("image/webp") => "image/webp",
        _ => DEFAULT_IMAGE_TYPE,
    }
}

async fn analyze(
    st: &AppState,
    modality: Modality,
    content: UserContent,
) -> Result<NutritionEstimate, NutritionError> {
    let req = AnalysisRequest {
        model: modality.model(&st.config.anthropic).to_string(),
        system: SYSTEM_PROMPT,
        content,
    };
    let raw = st.llm.complete(req).await?;
    parse_nutrition(&raw).map_err(|e| {
        tracing::error!(error = %e, ?modality, "analysis reply is not nutrition JSON");
        NutritionError::Parse(e)
    })
}

#[instrument(skip(st, text), fields(chars = text.len()))]
pub async fn analyze_text(st: &AppState, text: &str) -> Result<NutritionEstimate, NutritionError> {
    analyze(st, Modality::Text, UserContent::Text(text.to_string())).await
}

/// Transcribes first; a transcription without `text` is answered with an
/// error payload and no analysis call is made.
#[instrument(skip(st, audio), fields(filename = %audio.filename, bytes = audio.body.len()))]
pub async fn analyze_audio(
    st: &AppState,
    audio: AudioUpload,
) -> Result<LogResponse, NutritionError> {
    let raw = st.transcriber.transcribe(audio).await?;
    let Some(transcript) = raw.get("text").and_then(Value::as_str).map(str::to_owned) else {
        warn!(details = %raw, "transcription response has no text");
        return Ok(LogResponse::TranscriptionFailed {
            error: TRANSCRIPTION_ERROR.into(),
            details: raw,
        });
    };
    info!(chars = transcript.len(), "audio transcribed");

    let mut estimate = analyze(st, Modality::Audio, UserContent::Text(transcript.clone())).await?;
    estimate.attach_transcript(transcript);
    Ok(LogResponse::Estimate(estimate))
}

#[instrument(skip(st, image), fields(bytes = image.len()))]
pub async fn analyze_photo(
    st: &AppState,
    image: Bytes,
    media_type: &str,
) -> Result<NutritionEstimate, NutritionError> {
    let content = UserContent::Image {
        media_type: media_type.to_string(),
        data_b64: STANDARD.encode(&image),
        instruction: PHOTO_INSTRUCTION.to_string(),
    };
    analyze(st, Modality::Photo, content).await
}

/// Verified product data when the database knows the code, otherwise a model
/// estimate for an unknown product.
#[instrument(skip(st))]
pub async fn analyze_barcode(st: &AppState, code: &str) -> Result<LogResponse, NutritionError> {
    let lookup = st.products.lookup(code).await?;
    if let Some(product) = lookup.into_found() {
        info!(barcode = %code, "product found");
        return Ok(LogResponse::Verified(record_from_product(product)));
    }

    warn!(barcode = %code, "product not found; asking model");
    let estimate = analyze(
        st,
        Modality::Barcode,
        UserContent::Text(barcode_fallback_prompt(code)),
    )
    .await?;
    Ok(LogResponse::Estimate(estimate))
}

/// Missing nutriments count as zero.
// TODO: report zero-filled nutriments with lower confidence once clients can show it.
fn record_from_product(product: Product) -> NutritionRecord {
    let name = match product.product_name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN_PRODUCT_NAME.to_string(),
    };
    let item = FoodItem {
        name,
        amount_g: Number::from(100),
        calories: product.nutriment("energy-kcal_100g"),
        protein_g: product.nutriment("proteins_100g"),
        carbs_g: product.nutriment("carbohydrates_100g"),
        fat_g: product.nutriment("fat_100g"),
        confidence: Confidence::High,
        note: Some(VERIFIED_NOTE.to_string()),
    };
    NutritionRecord::single(item, PRODUCT_DB_SOURCE)
}
