//! Axum router wiring.
//!
//! - `POST /`      : metric ingest
//! - `GET /healthz`: liveness

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(transport::http::ingest))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
