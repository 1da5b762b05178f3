use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode},
};
use florecer_api::{app::create_app, routes::health::health_check};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let response = health_check(State(db.state.clone())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    Ok(())
}

#[tokio::test]
async fn health_reports_closed_pool() -> anyhow::Result<()> {
    let db = common::setup().await?;
    db.state.pool.close().await;

    let data = health_check(State(db.state.clone())).await.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "unavailable");
    Ok(())
}

#[tokio::test]
async fn unknown_path_gets_json_404() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let app = create_app(db.state.clone())?;

    let response = app
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["path"], "/api/nope");
    Ok(())
}
