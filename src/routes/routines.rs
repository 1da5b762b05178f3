use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::routines::{CreateRoutineRequest, RoutineList, UpdateRoutineRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Routine,
    response::ApiResponse,
    services::routine_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routines).post(create_routine))
        .route(
            "/{id}",
            get(get_routine).put(update_routine).delete(delete_routine),
        )
}

#[utoipa::path(
    get,
    path = "/api/routines",
    responses(
        (status = 200, description = "Caller's routines", body = ApiResponse<RoutineList>)
    ),
    security(("session_cookie" = [])),
    tag = "Routines"
)]
pub async fn list_routines(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RoutineList>>> {
    let resp = routine_service::list_routines(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/routines/{id}",
    params(
        ("id" = i64, Path, description = "Routine ID")
    ),
    responses(
        (status = 200, description = "Routine", body = ApiResponse<Routine>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Routine not found")
    ),
    security(("session_cookie" = [])),
    tag = "Routines"
)]
pub async fn get_routine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Routine>>> {
    let resp = routine_service::get_routine(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/routines",
    request_body = CreateRoutineRequest,
    responses(
        (status = 201, description = "Routine created", body = ApiResponse<Routine>),
        (status = 400, description = "Routine name is required")
    ),
    security(("session_cookie" = [])),
    tag = "Routines"
)]
pub async fn create_routine(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRoutineRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Routine>>)> {
    let resp = routine_service::create_routine(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/routines/{id}",
    params(
        ("id" = i64, Path, description = "Routine ID")
    ),
    request_body = UpdateRoutineRequest,
    responses(
        (status = 200, description = "Routine updated", body = ApiResponse<Routine>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Routine not found")
    ),
    security(("session_cookie" = [])),
    tag = "Routines"
)]
pub async fn update_routine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRoutineRequest>,
) -> AppResult<Json<ApiResponse<Routine>>> {
    let resp = routine_service::update_routine(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/routines/{id}",
    params(
        ("id" = i64, Path, description = "Routine ID")
    ),
    responses(
        (status = 200, description = "Routine deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Routine not found")
    ),
    security(("session_cookie" = [])),
    tag = "Routines"
)]
pub async fn delete_routine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = routine_service::delete_routine(&state, &user, id).await?;
    Ok(Json(resp))
}
