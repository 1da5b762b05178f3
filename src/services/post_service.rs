use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::{
    audit,
    dto::posts::{CreatePostRequest, PostList, UpdatePostRequest},
    entity::{
        posts::{ActiveModel, Column, Entity as Posts, Model as PostModel},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Post, PostAuthor},
    response::{ApiResponse, Meta},
    routes::params::PostQuery,
    state::AppState,
};

pub async fn list_posts(state: &AppState, query: PostQuery) -> AppResult<ApiResponse<PostList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(published) = query.published {
        condition = condition.add(Column::Published.eq(published));
    }

    let finder = Posts::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(post_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "OK",
        PostList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_post(state: &AppState, id: i64) -> AppResult<ApiResponse<Post>> {
    let post = load_post(state, id).await?;
    Ok(ApiResponse::success("OK", post, None))
}

pub async fn create_post(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePostRequest,
) -> AppResult<ApiResponse<Post>> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".into()));
    }

    let created = ActiveModel {
        id: NotSet,
        author_id: Set(user.user_id),
        title: Set(title),
        content: Set(payload.content),
        published: Set(payload.published),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "post_create",
        "posts",
        serde_json::json!({ "post_id": created.id }),
    )
    .await;

    let post = load_post(state, created.id).await?;
    Ok(ApiResponse::success("Post created", post, Some(Meta::empty())))
}

/// Only the author may update. Absent fields keep their stored value.
pub async fn update_post(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdatePostRequest,
) -> AppResult<ApiResponse<Post>> {
    let existing = find_owned(state, user, id, "You can only edit your own posts").await?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title cannot be empty".into()));
        }
        active.title = Set(title);
    }
    if let Some(content) = payload.content {
        active.content = Set(Some(content));
    }
    if let Some(published) = payload.published {
        active.published = Set(published);
    }
    active.updated_at = Set(Utc::now());
    active.update(&state.orm).await?;

    let post = load_post(state, id).await?;
    Ok(ApiResponse::success("Post updated", post, Some(Meta::empty())))
}

pub async fn delete_post(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(state, user, id, "You can only delete your own posts").await?;
    Posts::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "post_delete",
        "posts",
        serde_json::json!({ "post_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Post deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_owned(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    denied: &str,
) -> AppResult<PostModel> {
    let existing = Posts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Post"))?;

    if existing.author_id != user.user_id {
        tracing::warn!(post_id = id, user_id = user.user_id, "post ownership check failed");
        return Err(AppError::Forbidden(denied.to_string()));
    }
    Ok(existing)
}

async fn load_post(state: &AppState, id: i64) -> AppResult<Post> {
    let row = Posts::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Post"))?;
    post_from_entity(row)
}

fn post_from_entity((post, author): (PostModel, Option<UserModel>)) -> AppResult<Post> {
    let author = author.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("post {} has no author", post.id))
    })?;
    Ok(Post {
        id: post.id,
        title: post.title,
        content: post.content,
        published: post.published,
        author_id: post.author_id,
        author: PostAuthor {
            id: author.id,
            username: author.username,
            email: author.email,
        },
        created_at: post.created_at,
        updated_at: post.updated_at,
    })
}
