//! Cart pricing engine.
//!
//! Every mutation runs in one transaction that starts with a write to `carts`,
//! so SQLite's write lock serializes concurrent mutations of the same cart.
//! The stored `carts.total` is recomputed from the full item list before the
//! transaction commits; it is never adjusted incrementally.

use sqlx::SqliteConnection;

use crate::{
    audit,
    dto::cart::{AddCartItemRequest, CartView, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartLine},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Recomputes the total of the cart bound to `?` in a single statement.
/// Used where the trigger is outside the cart itself (product re-pricing or removal).
pub const REFRESH_TOTAL_SQL: &str = r#"
UPDATE carts
SET total = COALESCE((
        SELECT SUM(p.price * ci.quantity)
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = carts.id
    ), 0),
    updated_at = CURRENT_TIMESTAMP
WHERE id = ?
"#;

/// Most units of one product a single cart line may hold.
pub const MAX_QUANTITY: i64 = 10_000;

pub fn cart_total(lines: &[CartLine]) -> AppResult<i64> {
    lines.iter().try_fold(0_i64, |total, line| {
        line.price
            .checked_mul(line.quantity)
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(|| AppError::BadRequest("cart total is too large".to_string()))
    })
}

fn quantity_too_large() -> AppError {
    AppError::BadRequest(format!("quantity cannot exceed {MAX_QUANTITY}"))
}

/// Returns the user's cart, creating an empty one on first access.
pub async fn get_or_create_cart(conn: &mut SqliteConnection, user_id: i64) -> AppResult<Cart> {
    sqlx::query("INSERT INTO carts (user_id, total) VALUES (?, 0) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(cart)
}

async fn load_lines(conn: &mut SqliteConnection, cart_id: i64) -> AppResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity,
               p.name, p.description, p.price, p.image_url, p.category,
               p.price * ci.quantity AS line_total
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = ?
        ORDER BY ci.created_at, ci.id
        "#,
    )
    .bind(cart_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(lines)
}

/// Recompute the total from the current lines and persist it.
async fn persist_total(conn: &mut SqliteConnection, cart_id: i64) -> AppResult<CartView> {
    let items = load_lines(conn, cart_id).await?;
    let total = cart_total(&items)?;

    let cart = sqlx::query_as::<_, Cart>(
        "UPDATE carts SET total = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
    )
    .bind(total)
    .bind(cart_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Cart"))?;

    Ok(CartView { cart, items })
}

async fn delete_line(conn: &mut SqliteConnection, cart_id: i64, item_id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = ? AND cart_id = ?")
        .bind(item_id)
        .bind(cart_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Cart item"));
    }
    Ok(())
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, user.user_id).await?;
    let items = load_lines(&mut tx, cart.id).await?;
    tx.commit().await?;

    let count = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        CartView { cart, items },
        Some(Meta::count(count)),
    ))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    if payload.quantity > MAX_QUANTITY {
        return Err(quantity_too_large());
    }

    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, user.user_id).await?;

    let product_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = ?")
        .bind(payload.product_id)
        .fetch_optional(&mut *tx)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::not_found("Product"));
    }

    let (merged,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO cart_items (cart_id, product_id, quantity)
        VALUES (?, ?, ?)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + excluded.quantity,
                      updated_at = CURRENT_TIMESTAMP
        RETURNING quantity
        "#,
    )
    .bind(cart.id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(&mut *tx)
    .await?;
    // Dropping the transaction rolls the merge back.
    if merged > MAX_QUANTITY {
        return Err(quantity_too_large());
    }

    let view = persist_total(&mut tx, cart.id).await?;
    tx.commit().await?;

    tracing::debug!(cart_id = view.cart.id, total = view.cart.total, "cart item added");
    audit::record(
        &state.pool,
        user.user_id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Item added to cart", view, None))
}

/// A quantity of zero or below removes the line instead of storing it.
pub async fn update_item_quantity(
    state: &AppState,
    user: &AuthUser,
    item_id: i64,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    if payload.quantity > MAX_QUANTITY {
        return Err(quantity_too_large());
    }

    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, user.user_id).await?;

    let message = if payload.quantity <= 0 {
        delete_line(&mut tx, cart.id, item_id).await?;
        "Item removed from cart"
    } else {
        let result = sqlx::query(
            r#"
            UPDATE cart_items
            SET quantity = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND cart_id = ?
            "#,
        )
        .bind(payload.quantity)
        .bind(item_id)
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Cart item"));
        }
        "Item updated successfully"
    };

    let view = persist_total(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "item_id": item_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success(message, view, None))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    item_id: i64,
) -> AppResult<ApiResponse<CartView>> {
    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, user.user_id).await?;
    delete_line(&mut tx, cart.id, item_id).await?;
    let view = persist_total(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "item_id": item_id }),
    )
    .await;

    Ok(ApiResponse::success("Item removed from cart", view, None))
}

pub async fn remove_product(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
) -> AppResult<ApiResponse<CartView>> {
    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, user.user_id).await?;

    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = ? AND cart_id = ?")
        .bind(product_id)
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Cart item"));
    }

    let view = persist_total(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success("Item removed from cart", view, None))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let mut tx = state.pool.begin().await?;
    let cart = get_or_create_cart(&mut tx, user.user_id).await?;

    sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
        .bind(cart.id)
        .execute(&mut *tx)
        .await?;

    let view = persist_total(&mut tx, cart.id).await?;
    tx.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_clear",
        "carts",
        serde_json::json!({ "cart_id": cart.id }),
    )
    .await;

    Ok(ApiResponse::success("Cart cleared successfully", view, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, price: i64, quantity: i64) -> CartLine {
        CartLine {
            id: product_id,
            cart_id: 1,
            product_id,
            quantity,
            name: format!("product {product_id}"),
            description: None,
            price,
            image_url: None,
            category: None,
            line_total: price * quantity,
        }
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]).unwrap(), 0);
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let lines = [line(1, 4599, 2), line(2, 3250, 1), line(3, 2875, 3)];
        assert_eq!(cart_total(&lines).unwrap(), 4599 * 2 + 3250 + 2875 * 3);
    }

    #[test]
    fn cents_do_not_drift() {
        // 0.10 + 0.20 style sums stay exact in integer cents.
        let lines: Vec<CartLine> = (1..=30).map(|i| line(i, 10, 1)).chain([line(31, 20, 1)]).collect();
        assert_eq!(cart_total(&lines).unwrap(), 320);
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let lines = [line(1, i64::MAX / 2 + 10, 1), line(2, i64::MAX / 2 + 10, 1)];
        assert!(matches!(cart_total(&lines), Err(AppError::BadRequest(_))));

        let mut huge = line(1, i64::MAX / 4, 1);
        huge.quantity = 8;
        assert!(matches!(cart_total(&[huge]), Err(AppError::BadRequest(_))));
    }
}
