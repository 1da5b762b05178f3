use crate::{
    audit,
    db::DbPool,
    dto::favorites::{AddFavoriteRequest, FavoriteCheck, FavoriteProduct, FavoriteProductList},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::AuthUser,
    models::Favorite,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

const ALREADY_FAVORITED: &str = "Product already in favorites";

pub async fn list_favorites(
    db: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let items = sqlx::query_as::<_, FavoriteProduct>(
        r#"
        SELECT f.id, f.product_id, p.name, p.description, p.price, p.image_url, p.category,
               f.created_at
        FROM favorites f
        JOIN products p ON p.id = f.product_id
        WHERE f.user_id = ?
        ORDER BY f.created_at DESC, f.id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
        .bind(user.user_id)
        .fetch_one(db)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        FavoriteProductList { items },
        Some(meta),
    ))
}

pub async fn add_favorite(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Favorite>> {
    let product_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = ?")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::not_found("Product"));
    }

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM favorites WHERE user_id = ? AND product_id = ?")
            .bind(user.user_id)
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(ALREADY_FAVORITED.into()));
    }

    let favorite = sqlx::query_as::<_, Favorite>(
        "INSERT INTO favorites (user_id, product_id) VALUES (?, ?) RETURNING *",
    )
    .bind(user.user_id)
    .bind(payload.product_id)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Conflict(ALREADY_FAVORITED.into())
        } else {
            AppError::DbError(err)
        }
    })?;

    audit::record(
        pool,
        user.user_id,
        "favorite_add",
        "favorites",
        serde_json::json!({ "product_id": payload.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product added to favorites",
        favorite,
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    pool: &DbPool,
    user: &AuthUser,
    product_id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND product_id = ?")
        .bind(user.user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Favorite"));
    }

    audit::record(
        pool,
        user.user_id,
        "favorite_remove",
        "favorites",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product removed from favorites",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn check_favorite(
    pool: &DbPool,
    user: &AuthUser,
    product_id: i64,
) -> AppResult<ApiResponse<FavoriteCheck>> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM favorites WHERE user_id = ? AND product_id = ?")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await?;

    Ok(ApiResponse::success(
        "OK",
        FavoriteCheck {
            is_favorite: existing.is_some(),
        },
        None,
    ))
}
