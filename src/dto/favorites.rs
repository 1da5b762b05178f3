use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddFavoriteRequest {
    pub product_id: i64,
}

/// A favorite joined with the product it bookmarks.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct FavoriteProduct {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteProductList {
    #[schema(value_type = Vec<FavoriteProduct>)]
    pub items: Vec<FavoriteProduct>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FavoriteCheck {
    pub is_favorite: bool,
}
