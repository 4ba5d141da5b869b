use super::dto::NutritionEstimate;

const FENCE_OPEN: &str = "```json";
const FENCE: &str = "```";

/// Decodes model output, tolerating markdown code fences.
///
/// Every fence marker is removed wherever it appears, not only at the edges,
/// then surrounding whitespace is trimmed. The object comes back untouched.
pub fn parse_nutrition(raw: &str) -> Result<NutritionEstimate, serde_json::Error> {
    let clean = raw.trim().replace(FENCE_OPEN, "").replace(FENCE, "");
    serde_json::from_str(clean.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const RECORD: &str = r#"{
        "items": [
            {"name": "Banan", "amount_g": 120, "calories": 107, "protein_g": 1.3,
             "carbs_g": 27, "fat_g": 0.4, "confidence": "medium",
             "note": "medelstor banan"}
        ],
        "total_calories": 107,
        "total_protein_g": 1.3,
        "total_carbs_g": 27,
        "total_fat_g": 0.4
    }"#;

    #[test]
    fn plain_json_decodes() {
        let record = parse_nutrition(RECORD).unwrap();
        assert_eq!(record.items().len(), 1);
        assert_eq!(record.items()[0]["name"], "Banan");
        assert_eq!(record.items()[0]["note"], "medelstor banan");
        assert_eq!(record.get("total_calories"), Some(&Value::from(107)));
        assert!(record.get("source").is_none());
    }

    #[test]
    fn fenced_json_equals_plain_json() {
        let plain = parse_nutrition(RECORD).unwrap();
        let fenced = parse_nutrition(&format!("```json\n{RECORD}\n```")).unwrap();
        let bare_fence = parse_nutrition(&format!("  ```\n{RECORD}\n```  \n")).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain, bare_fence);
        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::from_str::<Value>(RECORD).unwrap()
        );
    }

    #[test]
    fn extra_keys_and_integers_survive() {
        let raw = r#"{"meal": "frukost", "items": [{"name": "Kaffe", "amount_g": 200,
            "portion": "kopp", "calories": 4, "confidence": "high"}], "total_calories": 4}"#;
        let record = parse_nutrition(raw).unwrap();
        let out = serde_json::to_string(&record).unwrap();

        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            serde_json::from_str::<Value>(raw).unwrap()
        );
        assert!(out.contains("\"amount_g\":200"));
        assert!(!out.contains("200.0"));
        assert!(out.contains("\"meal\":\"frukost\""));
        assert!(out.contains("\"portion\":\"kopp\""));
    }

    #[test]
    fn fences_inside_payload_are_removed_too() {
        let raw = r#"{"items": [], "total_calories": 0, ```"total_protein_g": 0,
            "total_carbs_g": 0, "total_fat_g": 0}```json"#;
        let record = parse_nutrition(raw).unwrap();
        assert!(record.items().is_empty());
        assert_eq!(record.get("total_fat_g"), Some(&Value::from(0)));
    }

    #[test]
    fn malformed_json_fails() {
        assert!(parse_nutrition("```json\n{\"items\": [\n```").is_err());
        assert!(parse_nutrition("Här är din analys: {}").is_err());
        assert!(parse_nutrition("").is_err());
    }

    #[test]
    fn non_object_json_fails() {
        assert!(parse_nutrition("[1, 2, 3]").is_err());
        assert!(parse_nutrition("\"ingen mat\"").is_err());
        assert!(parse_nutrition("null").is_err());
    }
}
