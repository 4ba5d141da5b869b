pub mod dto;
mod extractors;
pub mod handlers;
mod parse;
pub mod prompts;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::health_routes())
        .merge(handlers::log_routes())
        .merge(handlers::media_routes())
}
