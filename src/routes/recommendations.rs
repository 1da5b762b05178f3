use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    dto::recommendations::{CreateRecommendationRequest, RecommendationList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Recommendation,
    response::ApiResponse,
    services::recommendation_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mine).post(create_recommendation))
        .route("/all", get(list_all))
        .route("/{id}/read", put(mark_read))
}

#[utoipa::path(
    get,
    path = "/api/recommendations",
    responses(
        (status = 200, description = "Recommendations addressed to the caller", body = ApiResponse<RecommendationList>)
    ),
    security(("session_cookie" = [])),
    tag = "Recommendations"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RecommendationList>>> {
    let resp = recommendation_service::list_for_user(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/recommendations/all",
    responses(
        (status = 200, description = "Every recommendation", body = ApiResponse<RecommendationList>),
        (status = 403, description = "Admin role required")
    ),
    security(("session_cookie" = [])),
    tag = "Recommendations"
)]
pub async fn list_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RecommendationList>>> {
    let resp = recommendation_service::list_all(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/recommendations",
    request_body = CreateRecommendationRequest,
    responses(
        (status = 201, description = "Recommendation created", body = ApiResponse<Recommendation>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User or product not found")
    ),
    security(("session_cookie" = [])),
    tag = "Recommendations"
)]
pub async fn create_recommendation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRecommendationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Recommendation>>)> {
    let resp = recommendation_service::create_recommendation(&state.pool, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/recommendations/{id}/read",
    params(
        ("id" = i64, Path, description = "Recommendation ID")
    ),
    responses(
        (status = 200, description = "Marked as read", body = ApiResponse<Recommendation>),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Recommendation not found")
    ),
    security(("session_cookie" = [])),
    tag = "Recommendations"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Recommendation>>> {
    let resp = recommendation_service::mark_read(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
