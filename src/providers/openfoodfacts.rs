use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::ProductDatabase;

const USER_AGENT: &str = concat!("nutrilog/", env!("CARGO_PKG_VERSION"));

/// Body of `GET /api/v0/product/{code}.json`. Only `status == 1` means found.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub product: Option<Product>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub nutriments: Map<String, Value>,
}

impl ProductResponse {
    pub fn into_found(self) -> Option<Product> {
        if self.status.as_i64() == Some(1) {
            self.product
        } else {
            None
        }
    }
}

impl Product {
    /// Numeric nutriment value as the database sent it; numeric strings are
    /// accepted, anything else is 0.
    pub fn nutriment(&self, key: &str) -> Number {
        match self.nutriments.get(key) {
            Some(Value::Number(n)) => n.clone(),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .unwrap_or_else(|| Number::from(0)),
            _ => Number::from(0),
        }
    }
}

#[derive(Clone)]
pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProductDatabase for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> anyhow::Result<ProductResponse> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .with_context(|| format!("openfoodfacts lookup {}", barcode))?;
        debug!(status = %response.status(), %barcode, "openfoodfacts responded");
        response
            .json::<ProductResponse>()
            .await
            .context("decode openfoodfacts response")
    }
}
