use crate::config::AnthropicConfig;

/// System prompt shared by every analysis call.
pub const SYSTEM_PROMPT: &str = r#"Du är en nutritionsexpert. Analysera matinput och returnera ALLTID giltig JSON.
Format:
{
  "items": [
    {
      "name": "Livsmedel",
      "amount_g": 100,
      "calories": 150,
      "protein_g": 10,
      "carbs_g": 15,
      "fat_g": 5,
      "confidence": "high|medium|low",
      "note": "valfri kommentar vid osäkerhet"
    }
  ],
  "total_calories": 150,
  "total_protein_g": 10,
  "total_carbs_g": 15,
  "total_fat_g": 5
}
Svara ENDAST med JSON, ingen annan text."#;

/// Text block sent after the image on the photo path.
pub const PHOTO_INSTRUCTION: &str = "Analysera maten på bilden och uppskatta nutritionsvärden.";

pub const UNKNOWN_PRODUCT_NAME: &str = "Okänd produkt";
pub const VERIFIED_NOTE: &str = "Verifierad data från Open Food Facts";
pub const TRANSCRIPTION_ERROR: &str = "Whisper fel";

pub fn barcode_fallback_prompt(barcode: &str) -> String {
    format!(
        "Streckkod {} hittades inte i databas. Ge ett generiskt svar om okänd produkt.",
        barcode
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Audio,
    Photo,
    Barcode,
}

impl Modality {
    /// Text-only models cannot take image content, so photos get the vision model.
    pub fn model(self, cfg: &AnthropicConfig) -> &str {
        match self {
            Modality::Text | Modality::Audio | Modality::Barcode => &cfg.text_model,
            Modality::Photo => &cfg.vision_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_photo_uses_vision_model() {
        let cfg = AnthropicConfig {
            api_key: String::new(),
            base_url: String::new(),
            text_model: "haiku".into(),
            vision_model: "sonnet".into(),
            max_tokens: 800,
        };
        assert_eq!(Modality::Photo.model(&cfg), "sonnet");
        for m in [Modality::Text, Modality::Audio, Modality::Barcode] {
            assert_eq!(m.model(&cfg), "haiku");
        }
    }

    #[test]
    fn fallback_prompt_names_the_code() {
        let prompt = barcode_fallback_prompt("7350000000001");
        assert!(prompt.contains("7350000000001"));
        assert!(prompt.starts_with("Streckkod"));
    }
}
