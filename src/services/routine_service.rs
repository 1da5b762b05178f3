use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    audit,
    dto::routines::{CreateRoutineRequest, RoutineList, UpdateRoutineRequest},
    entity::routines::{ActiveModel, Column, Entity as Routines, Model as RoutineModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Routine, decode_string_list, encode_string_list},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_routines(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RoutineList>> {
    let items = Routines::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(routine_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        RoutineList { items },
        Some(Meta::count(total)),
    ))
}

pub async fn get_routine(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Routine>> {
    let model = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("OK", routine_from_entity(model)?, None))
}

pub async fn create_routine(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRoutineRequest,
) -> AppResult<ApiResponse<Routine>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Routine name is required".into()));
    }

    let model = ActiveModel {
        id: NotSet,
        user_id: Set(user.user_id),
        name: Set(name),
        kind: Set(payload.kind),
        steps: Set(encode_string_list(&payload.steps)?),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "routine_create",
        "routines",
        serde_json::json!({ "routine_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Routine created",
        routine_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_routine(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateRoutineRequest,
) -> AppResult<ApiResponse<Routine>> {
    let existing = find_owned(state, user, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Routine name cannot be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(Some(kind));
    }
    if let Some(steps) = payload.steps {
        active.steps = Set(encode_string_list(&steps)?);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Routine updated",
        routine_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_routine(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(state, user, id).await?;
    Routines::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "routine_delete",
        "routines",
        serde_json::json!({ "routine_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Routine deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_owned(state: &AppState, user: &AuthUser, id: i64) -> AppResult<RoutineModel> {
    let model = Routines::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Routine"))?;

    if model.user_id != user.user_id {
        return Err(AppError::Forbidden("Access denied".into()));
    }
    Ok(model)
}

fn routine_from_entity(model: RoutineModel) -> AppResult<Routine> {
    Ok(Routine {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        kind: model.kind,
        steps: decode_string_list(&model.steps)?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
