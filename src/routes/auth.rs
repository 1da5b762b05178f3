use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    dto::auth::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::{AuthUser, SessionKeys},
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service::{self, current_user, login_user, register_user, update_profile},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me).put(update_me))
}

fn with_session(
    keys: &SessionKeys,
    status: StatusCode,
    session: auth_service::Session,
) -> impl IntoResponse + use<> {
    let cookie = keys.session_cookie(&session.token);
    (status, [(header::SET_COOKIE, cookie)], Json(session.body))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created, session cookie set", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email or username already taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let session = register_user(&state.pool, &state.keys, payload).await?;
    Ok(with_session(&state.keys, StatusCode::CREATED, session))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let session = login_user(&state.pool, &state.keys, payload).await?;
    Ok(with_session(&state.keys, StatusCode::OK, session))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = ApiResponse<serde_json::Value>)
    ),
    tag = "Auth"
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.keys.clear_cookie())],
        Json(ApiResponse::success(
            "Logout successful",
            serde_json::json!({}),
            Some(Meta::empty()),
        )),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<User>),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = current_user(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<User>),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = update_profile(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}
