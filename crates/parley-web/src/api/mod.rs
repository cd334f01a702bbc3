mod auth_handlers;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/token", post(auth_handlers::login))
        .route("/signup", post(auth_handlers::signup))
        .route("/clear_sessions", get(auth_handlers::clear_sessions))
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "Message": "see docs" }))
}
