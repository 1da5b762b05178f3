#![allow(dead_code)]

use florecer_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        products::CreateProductRequest,
    },
    middleware::auth::AuthUser,
    models::{Product, Role},
    services::{auth_service, product_service},
    state::AppState,
};
use tempfile::TempDir;

pub const PASSWORD: &str = "s3cret-pass";

/// Application state over a fresh, migrated SQLite file. The directory lives
/// as long as the value does.
pub struct TestDb {
    pub state: AppState,
    _dir: TempDir,
}

pub async fn setup() -> anyhow::Result<TestDb> {
    let dir = tempfile::tempdir()?;
    let database_url = format!("sqlite://{}", dir.path().join("florecer-test.db").display());
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        cookie_secure: false,
        cors_origin: "http://localhost:3000".into(),
    };
    Ok(TestDb {
        state: AppState::new(pool, config),
        _dir: dir,
    })
}

pub async fn register(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let session = auth_service::register_user(
        &state.pool,
        &state.keys,
        RegisterRequest {
            email: format!("{username}@florecer.test"),
            username: username.into(),
            password: PASSWORD.into(),
        },
    )
    .await?;
    Ok(state.keys.verify(&session.token)?)
}

/// Logs in a registered user, returning the decoded identity and the raw token.
pub async fn login(state: &AppState, username: &str) -> anyhow::Result<(AuthUser, String)> {
    let session = auth_service::login_user(
        &state.pool,
        &state.keys,
        LoginRequest {
            email: format!("{username}@florecer.test"),
            password: PASSWORD.into(),
        },
    )
    .await?;
    let user = state.keys.verify(&session.token)?;
    Ok((user, session.token))
}

/// Registers a user, promotes it and logs in again so the token carries the admin role.
pub async fn register_admin(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    register(state, username).await?;
    auth_service::set_role(&state.pool, &format!("{username}@florecer.test"), Role::Admin).await?;
    let (admin, _) = login(state, username).await?;
    Ok(admin)
}

pub async fn create_product(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    price: i64,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            name: name.into(),
            description: Some(format!("{name} for testing")),
            price,
            image_url: None,
            category: Some("skincare".into()),
        },
    )
    .await?;
    Ok(resp.data.expect("product data"))
}
