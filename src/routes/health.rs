use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    /// `ok` when a trivial query succeeds, `unavailable` otherwise.
    pub database: String,
}

/// Liveness probe. Always 200; database trouble is reported in the body.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(
        "Health check",
        probe(&state.pool).await,
        Some(Meta::empty()),
    ))
}

pub async fn probe(pool: &DbPool) -> HealthData {
    let database = match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "health probe failed");
            "unavailable"
        }
    };
    HealthData {
        status: "ok".to_string(),
        database: database.to_string(),
    }
}
