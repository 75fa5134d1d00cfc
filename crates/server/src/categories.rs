//! Expense category API endpoints

use api_types::{
    category::{CategoryInput, CategoryView},
    order::Reorder,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{category_kind, map_category},
};

/// Append a category to a plan.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            user.id,
            plan_id,
            &payload.title,
            category_kind(payload.category_type),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<CategoryInput>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(
            user.id,
            category_id,
            &payload.title,
            category_kind(payload.category_type),
        )
        .await?;

    Ok(Json(map_category(category)))
}

/// Delete a category together with its items.
pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let plan_id = state.engine.delete_category(user.id, category_id).await?;
    state.publish_balance(user.id, plan_id).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Reorder the categories of the plan owning `category_id`.
pub async fn reorder(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<Reorder>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reorder_categories(user.id, category_id, &payload.ids)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
