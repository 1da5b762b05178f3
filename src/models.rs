use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Unknown values fall back to the least privileged role.
    pub fn parse(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Row as stored in `users`, including the password hash. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub description: Option<String>,
    pub preferences: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub description: Option<String>,
    pub preferences: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = AppError;

    fn try_from(record: UserRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id,
            email: record.email,
            username: record.username,
            role: Role::parse(&record.role),
            avatar_url: record.avatar_url,
            bio: record.bio,
            description: record.description,
            preferences: decode_string_list(&record.preferences)?,
            created_at: record.created_at,
        })
    }
}

/// Prices are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One cart item joined with the product it points at.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CartLine {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub line_total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Routine {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: Option<String>,
    pub steps: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Recommendation {
    pub id: i64,
    pub admin_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostAuthor {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub author_id: i64,
    pub author: PostAuthor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decode a JSON text column holding a list of strings.
pub fn decode_string_list(raw: &str) -> AppResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt list column: {e}")))
}

pub fn encode_string_list(items: &[String]) -> AppResult<String> {
    serde_json::to_string(items).map_err(|e| AppError::Internal(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_lists_keep_their_order() {
        let steps = vec!["cleanse".to_string(), "tone".to_string(), "moisturize".to_string()];
        let encoded = encode_string_list(&steps).unwrap();
        assert_eq!(encoded, r#"["cleanse","tone","moisturize"]"#);
        assert_eq!(decode_string_list(&encoded).unwrap(), steps);
    }

    #[test]
    fn empty_column_decodes_to_empty_list() {
        assert!(decode_string_list("").unwrap().is_empty());
        assert!(decode_string_list("[]").unwrap().is_empty());
    }

    #[test]
    fn non_list_column_is_an_error() {
        assert!(decode_string_list("{}").is_err());
    }

    #[test]
    fn unknown_role_is_user() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("rol"), Role::User);
    }
}
