use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Numbers keep the provider's representation, so `100` stays an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub amount_g: Number,
    pub calories: Number,
    pub protein_g: Number,
    pub carbs_g: Number,
    pub fat_g: Number,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Record built from verified product data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub items: Vec<FoodItem>,
    pub source: String,
    // Top-level copies of the item's values, kept for existing clients.
    pub calories: Number,
    pub protein_g: Number,
    pub carbs_g: Number,
    pub fat_g: Number,
    pub total_calories: Number,
    pub total_protein_g: Number,
    pub total_carbs_g: Number,
    pub total_fat_g: Number,
}

impl NutritionRecord {
    /// One-item record whose totals equal the item's values.
    pub fn single(item: FoodItem, source: &str) -> Self {
        Self {
            source: source.to_string(),
            calories: item.calories.clone(),
            protein_g: item.protein_g.clone(),
            carbs_g: item.carbs_g.clone(),
            fat_g: item.fat_g.clone(),
            total_calories: item.calories.clone(),
            total_protein_g: item.protein_g.clone(),
            total_carbs_g: item.carbs_g.clone(),
            total_fat_g: item.fat_g.clone(),
            items: vec![item],
        }
    }
}

/// Analysis model output, exactly as decoded. Only "is a JSON object" is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionEstimate(pub Map<String, Value>);

impl NutritionEstimate {
    pub fn items(&self) -> &[Value] {
        self.0
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn attach_transcript(&mut self, transcript: String) {
        self.0.insert("transcript".into(), Value::String(transcript));
    }
}

/// Body of every `/log/*` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogResponse {
    Estimate(NutritionEstimate),
    Verified(NutritionRecord),
    TranscriptionFailed {
        error: String,
        details: serde_json::Value,
    },
}

#[derive(Debug, Deserialize)]
pub struct TextForm {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct BarcodeForm {
    pub barcode: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub date: String,
}
