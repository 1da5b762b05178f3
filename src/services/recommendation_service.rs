use crate::{
    audit,
    db::DbPool,
    dto::recommendations::{CreateRecommendationRequest, RecommendationList, RecommendationView},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Recommendation,
    response::{ApiResponse, Meta},
};

const VIEW_SELECT: &str = r#"
    SELECT r.id, r.admin_id, a.username AS admin_username, r.user_id, r.product_id,
           r.message, r.is_read, p.name, p.description, p.price, p.image_url, p.category,
           r.created_at
    FROM recommendations r
    JOIN products p ON p.id = r.product_id
    JOIN users a ON a.id = r.admin_id
"#;

pub async fn list_for_user(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<RecommendationList>> {
    let sql = format!("{VIEW_SELECT} WHERE r.user_id = ? ORDER BY r.created_at DESC, r.id DESC");
    let items = sqlx::query_as::<_, RecommendationView>(&sql)
        .bind(user.user_id)
        .fetch_all(pool)
        .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        RecommendationList { items },
        Some(Meta::count(total)),
    ))
}

pub async fn list_all(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<RecommendationList>> {
    ensure_admin(user)?;
    let sql = format!("{VIEW_SELECT} ORDER BY r.created_at DESC, r.id DESC");
    let items = sqlx::query_as::<_, RecommendationView>(&sql)
        .fetch_all(pool)
        .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        RecommendationList { items },
        Some(Meta::count(total)),
    ))
}

pub async fn create_recommendation(
    pool: &DbPool,
    admin: &AuthUser,
    payload: CreateRecommendationRequest,
) -> AppResult<ApiResponse<Recommendation>> {
    ensure_admin(admin)?;

    let user_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(payload.user_id)
        .fetch_optional(pool)
        .await?;
    if user_exists.is_none() {
        return Err(AppError::not_found("User"));
    }

    let product_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = ?")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::not_found("Product"));
    }

    let message = payload
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let recommendation = sqlx::query_as::<_, Recommendation>(
        r#"
        INSERT INTO recommendations (admin_id, user_id, product_id, message)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(admin.user_id)
    .bind(payload.user_id)
    .bind(payload.product_id)
    .bind(message)
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        admin.user_id,
        "recommendation_create",
        "recommendations",
        serde_json::json!({
            "recommendation_id": recommendation.id,
            "user_id": payload.user_id,
            "product_id": payload.product_id,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Recommendation created successfully",
        recommendation,
        Some(Meta::empty()),
    ))
}

/// Only the recipient can mark a recommendation as read.
pub async fn mark_read(
    pool: &DbPool,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Recommendation>> {
    let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM recommendations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let (owner_id,) = owner.ok_or_else(|| AppError::not_found("Recommendation"))?;
    if owner_id != user.user_id {
        return Err(AppError::Forbidden("Access denied".into()));
    }

    // Scoped to the recipient so a row removed since the check reads as 404.
    let recommendation = sqlx::query_as::<_, Recommendation>(
        "UPDATE recommendations SET is_read = 1 WHERE id = ? AND user_id = ? RETURNING *",
    )
    .bind(id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Recommendation"))?;

    Ok(ApiResponse::success("Marked as read", recommendation, None))
}
