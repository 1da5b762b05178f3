use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecommendationRequest {
    pub user_id: i64,
    pub product_id: i64,
    pub message: Option<String>,
}

/// A recommendation joined with its product and issuing admin.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct RecommendationView {
    pub id: i64,
    pub admin_id: i64,
    pub admin_username: String,
    pub user_id: i64,
    pub product_id: i64,
    pub message: Option<String>,
    pub is_read: bool,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RecommendationList {
    #[schema(value_type = Vec<RecommendationView>)]
    pub items: Vec<RecommendationView>,
}
