use axum::{Router, routing::get};

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod params;
pub mod posts;
pub mod products;
pub mod recommendations;
pub mod routines;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/favorites", favorites::router())
        .nest("/routines", routines::router())
        .nest("/recommendations", recommendations::router())
        .nest("/posts", posts::router())
}
