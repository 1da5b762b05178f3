use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::{
    audit,
    db::DbPool,
    dto::auth::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::{AuthUser, SessionKeys},
    models::{Role, User, UserRecord, encode_string_list},
    response::{ApiResponse, Meta},
};

/// Response body plus the token the handler turns into a session cookie.
pub struct Session {
    pub token: String,
    pub body: ApiResponse<AuthResponse>,
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

async fn find_user(pool: &DbPool, user_id: i64) -> AppResult<UserRecord> {
    sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn register_user(
    pool: &DbPool,
    keys: &SessionKeys,
    payload: RegisterRequest,
) -> AppResult<Session> {
    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_string();
    if email.is_empty() || username.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "email, username and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }

    let exist: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE email = ? OR username = ?")
            .bind(email.as_str())
            .bind(username.as_str())
            .fetch_optional(pool)
            .await?;
    if exist.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email or username".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    let record = sqlx::query_as::<_, UserRecord>(
        "INSERT INTO users (email, username, password_hash) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(email.as_str())
    .bind(username.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        // A concurrent registration can pass the check above.
        if is_unique_violation(&err) {
            AppError::Conflict("User already exists with this email or username".to_string())
        } else {
            AppError::DbError(err)
        }
    })?;

    let token = keys.issue(&record)?;
    tracing::info!(user_id = record.id, "user registered");
    audit::record(
        pool,
        record.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": record.id }),
    )
    .await;

    let user = User::try_from(record)?;
    Ok(Session {
        body: ApiResponse::success(
            "User created successfully",
            AuthResponse {
                user,
                token: token.clone(),
            },
            Some(Meta::empty()),
        ),
        token,
    })
}

pub async fn login_user(
    pool: &DbPool,
    keys: &SessionKeys,
    payload: LoginRequest,
) -> AppResult<Session> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();
    let record: Option<UserRecord> =
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    let record = match record {
        Some(r) => r,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&password, &record.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = keys.issue(&record)?;
    audit::record(
        pool,
        record.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": record.id }),
    )
    .await;

    let user = User::try_from(record)?;
    Ok(Session {
        body: ApiResponse::success(
            "Login successful",
            AuthResponse {
                user,
                token: token.clone(),
            },
            Some(Meta::empty()),
        ),
        token,
    })
}

pub async fn current_user(pool: &DbPool, auth: &AuthUser) -> AppResult<ApiResponse<User>> {
    let record = find_user(pool, auth.user_id).await?;
    Ok(ApiResponse::success("OK", User::try_from(record)?, None))
}

pub async fn update_profile(
    pool: &DbPool,
    auth: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let current = find_user(pool, auth.user_id).await?;

    let preferences = match payload.preferences {
        Some(list) => encode_string_list(&list)?,
        None => current.preferences,
    };

    let record = sqlx::query_as::<_, UserRecord>(
        r#"
        UPDATE users
        SET avatar_url = ?, bio = ?, description = ?, preferences = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(payload.avatar_url.or(current.avatar_url))
    .bind(payload.bio.or(current.bio))
    .bind(payload.description.or(current.description))
    .bind(preferences)
    .bind(auth.user_id)
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        auth.user_id,
        "profile_update",
        "users",
        serde_json::json!({ "user_id": auth.user_id }),
    )
    .await;

    Ok(ApiResponse::success("Profile updated", User::try_from(record)?, None))
}

/// Grant or revoke the admin role. Used by the `migrate --promote` command.
pub async fn set_role(pool: &DbPool, email: &str, role: Role) -> AppResult<()> {
    let result = sqlx::query("UPDATE users SET role = ?, updated_at = CURRENT_TIMESTAMP WHERE email = ?")
        .bind(role.as_str())
        .bind(email.trim().to_lowercase())
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User"));
    }
    Ok(())
}
