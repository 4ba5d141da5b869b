use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NutritionError {
    /// Transport failure or non-success answer from an upstream provider.
    #[error("provider request failed: {0:#}")]
    Provider(#[from] anyhow::Error),
    #[error("analysis response is not a nutrition JSON object: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
    /// Request body the extractors refused; keeps their status (413, 415, 422, ...).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl NutritionError {
    pub fn status(&self) -> StatusCode {
        match self {
            NutritionError::Provider(_) => StatusCode::BAD_GATEWAY,
            NutritionError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NutritionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            NutritionError::Rejected { status, .. } => *status,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for NutritionError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        NutritionError::Rejected {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for NutritionError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
