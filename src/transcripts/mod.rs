mod export;
mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(page::transcript))
        .route("/{id}/export", get(export::export))
}
