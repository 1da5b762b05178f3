use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use florecer_api::{
    app::create_app,
    dto::auth::{LoginRequest, RegisterRequest, UpdateProfileRequest},
    error::AppError,
    services::auth_service,
};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Option<String>, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, cookie, body))
}

fn json_request(method: &str, uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn duplicate_email_or_username_conflicts() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    common::register(state, "ana").await?;

    let err = auth_service::register_user(
        &state.pool,
        &state.keys,
        RegisterRequest {
            email: "ANA@florecer.test".into(),
            username: "someone-else".into(),
            password: common::PASSWORD.into(),
        },
    )
    .await
    .err()
    .expect("duplicate email");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = auth_service::register_user(
        &state.pool,
        &state.keys,
        RegisterRequest {
            email: "other@florecer.test".into(),
            username: "ana".into(),
            password: common::PASSWORD.into(),
        },
    )
    .await
    .err()
    .expect("duplicate username");
    assert!(matches!(err, AppError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    common::register(state, "ana").await?;

    for (email, password) in [
        ("ana@florecer.test", "not-the-password"),
        ("nobody@florecer.test", common::PASSWORD),
    ] {
        let err = auth_service::login_user(
            &state.pool,
            &state.keys,
            LoginRequest {
                email: email.into(),
                password: password.into(),
            },
        )
        .await
        .err()
        .expect("login must fail");
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Invalid credentials"));
    }
    Ok(())
}

#[tokio::test]
async fn profile_update_keeps_absent_fields() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let ana = common::register(state, "ana").await?;

    auth_service::update_profile(
        &state.pool,
        &ana,
        UpdateProfileRequest {
            bio: Some("Loves serums".into()),
            preferences: Some(vec!["dry skin".into(), "vegan".into()]),
            ..Default::default()
        },
    )
    .await?;
    let user = auth_service::update_profile(
        &state.pool,
        &ana,
        UpdateProfileRequest {
            avatar_url: Some("https://cdn.florecer.test/ana.png".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("user");

    assert_eq!(user.bio.as_deref(), Some("Loves serums"));
    assert_eq!(user.preferences, vec!["dry skin".to_string(), "vegan".to_string()]);
    assert_eq!(user.avatar_url.as_deref(), Some("https://cdn.florecer.test/ana.png"));
    Ok(())
}

#[tokio::test]
async fn session_cookie_round_trip_over_http() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let app = create_app(db.state.clone())?;

    let (status, _, body) = send(
        &app,
        Request::builder().uri("/api/auth/me").body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["error"], "Access denied. No token provided.");

    let (status, cookie, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            json!({ "email": "ana@florecer.test", "username": "ana", "password": common::PASSWORD }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["username"], "ana");
    assert!(body["data"]["user"].get("password_hash").is_none());
    let cookie = cookie.expect("session cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));
    let pair = cookie.split(';').next().expect("cookie pair").to_string();

    let (status, _, body) = send(
        &app,
        Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, pair.as_str())
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ana@florecer.test");
    assert_eq!(body["data"]["role"], "user");

    // Bearer header works as a fallback for clients without cookies.
    let token = pair.trim_start_matches("token=");
    let (status, _, _) = send(
        &app,
        Request::builder()
            .uri("/api/cart")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, cleared, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/logout")
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared.expect("cleared cookie").contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_create_products() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let app = create_app(db.state.clone())?;
    common::register(&db.state, "ana").await?;
    let admin = common::register_admin(&db.state, "admin").await?;

    let (_, user_token) = common::login(&db.state, "ana").await?;
    let (status, _, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/products")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("token={user_token}"))
            .body(Body::from(json!({ "name": "Serum", "price": 1000 }).to_string()))?,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "admin role required");

    let product = common::create_product(&db.state, &admin, "Serum", 1000).await?;
    let (status, _, body) = send(
        &app,
        Request::builder()
            .uri(format!("/api/products/{}", product.id))
            .body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 1000);
    Ok(())
}
