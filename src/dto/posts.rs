use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Post;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PostList {
    #[schema(value_type = Vec<Post>)]
    pub items: Vec<Post>,
}
