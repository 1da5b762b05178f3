use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::posts::{CreatePostRequest, PostList, UpdatePostRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Post,
    response::ApiResponse,
    routes::params::PostQuery,
    services::post_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("published" = Option<bool>, Query, description = "Only published or only drafts"),
    ),
    responses(
        (status = 200, description = "Posts with author, newest first", body = ApiResponse<PostList>)
    ),
    tag = "Posts"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> AppResult<Json<ApiResponse<PostList>>> {
    let resp = post_service::list_posts(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post with author", body = ApiResponse<Post>),
        (status = 404, description = "Post not found")
    ),
    tag = "Posts"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Post>>> {
    let resp = post_service::get_post(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<Post>),
        (status = 400, description = "Title is required")
    ),
    security(("session_cookie" = [])),
    tag = "Posts"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Post>>)> {
    let resp = post_service::create_post(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<Post>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("session_cookie" = [])),
    tag = "Posts"
)]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> AppResult<Json<ApiResponse<Post>>> {
    let resp = post_service::update_post(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("session_cookie" = [])),
    tag = "Posts"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = post_service::delete_post(&state, &user, id).await?;
    Ok(Json(resp))
}
