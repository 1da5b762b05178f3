use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, DbBackend,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait,
};

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    audit,
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::cart_service::REFRESH_TOTAL_SQL,
    state::AppState,
};

/// Upper bound on a price in cents. Together with the cart quantity cap it
/// keeps every line total well inside `i64`.
pub const MAX_PRICE: i64 = 100_000_000;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        // SQLite LIKE is case-insensitive for ASCII.
        condition = condition.add(
            Condition::any()
                .add(Column::Name.contains(search))
                .add(Column::Description.contains(search)),
        );
    }

    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col).order_by_asc(Column::Id),
        SortOrder::Desc => finder.order_by_desc(sort_col).order_by_desc(Column::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: i64) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or_else(|| AppError::not_found("Product"))?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    validate_price(payload.price)?;

    let active = ActiveModel {
        id: NotSet,
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        image_url: Set(payload.image_url),
        category: Set(payload.category),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Partial update. A price change re-prices every cart holding the product
/// in the same transaction.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let mut active = ActiveModel {
        id: Set(id),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }

    let txn = state.orm.begin().await?;
    let product = match active.update(&txn).await {
        Ok(p) => p,
        Err(DbErr::RecordNotUpdated) => return Err(AppError::not_found("Product")),
        Err(err) => return Err(err.into()),
    };

    if payload.price.is_some() {
        let carts = affected_carts(
            &txn,
            "SELECT DISTINCT cart_id FROM cart_items WHERE product_id = ?",
            id,
        )
        .await?;
        refresh_cart_totals(&txn, &carts).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Deletes the product, its cart lines, favorites and recommendations, and
/// re-prices the carts that held it.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let carts = affected_carts(
        &txn,
        "DELETE FROM cart_items WHERE product_id = ? RETURNING cart_id",
        id,
    )
    .await?;

    let result = Products::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    refresh_cart_totals(&txn, &carts).await?;
    txn.commit().await?;

    tracing::info!(product_id = id, carts = carts.len(), "product deleted");
    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    if price > MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "price cannot exceed {MAX_PRICE} cents"
        )));
    }
    Ok(())
}

async fn affected_carts(txn: &DatabaseTransaction, sql: &str, product_id: i64) -> AppResult<Vec<i64>> {
    let rows = txn
        .query_all(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            sql,
            [product_id.into()],
        ))
        .await?;

    let mut carts = rows
        .iter()
        .map(|row| row.try_get::<i64>("", "cart_id"))
        .collect::<Result<Vec<_>, DbErr>>()?;
    carts.sort_unstable();
    carts.dedup();
    Ok(carts)
}

async fn refresh_cart_totals(txn: &DatabaseTransaction, carts: &[i64]) -> AppResult<()> {
    for cart_id in carts {
        txn.execute(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            REFRESH_TOTAL_SQL,
            [(*cart_id).into()],
        ))
        .await?;
    }
    Ok(())
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        image_url: model.image_url,
        category: model.category,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
