//! REST routes under /api.

use crate::handlers::{login, registration, users, workshops};
use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/workshops", get(workshops::list).post(workshops::create))
        .route(
            "/workshops/:id",
            get(workshops::read).put(workshops::update).delete(workshops::delete),
        )
        .route("/workshops/:id/register", post(registration::register))
        .route("/workshops/:id/registrations", get(registration::list))
        .route("/users", get(users::list).post(users::register))
        .route("/login", post(login::login))
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
}
