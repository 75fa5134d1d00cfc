//! Expense item API endpoints
//!
//! Every write that can move the plan totals publishes a `budget_updated`
//! event once committed.

use api_types::{
    item::{ItemNew, ItemPriority, ItemToggle, ItemUpdate, ItemView},
    order::Reorder,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewItemCmd, UpdateItemCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{map_item, priority},
};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((plan_id, category_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let cmd = NewItemCmd::new(
        payload.title,
        payload.amount_cents,
        priority(payload.priority_color),
    )
    .completed(payload.is_completed);

    let item = state
        .engine
        .create_item(user.id, plan_id, category_id, cmd)
        .await?;
    state.publish_balance(user.id, plan_id).await;

    Ok((StatusCode::CREATED, Json(map_item(item))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let cmd = UpdateItemCmd::new(
        payload.title,
        payload.amount_cents,
        priority(payload.priority_color),
    );

    let item = state.engine.update_item(user.id, item_id, cmd).await?;
    publish_for_item(&state, user.id, item.id).await;

    Ok(Json(map_item(item)))
}

/// Mark an item done or not done; `{}` flips it. Never budget-checked.
pub async fn toggle(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemToggle>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .toggle_item(user.id, item_id, payload.is_completed)
        .await?;
    publish_for_item(&state, user.id, item.id).await;

    Ok(Json(map_item(item)))
}

pub async fn set_priority(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemPriority>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .set_item_priority(user.id, item_id, priority(payload.priority_color))
        .await?;

    Ok(Json(map_item(item)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let plan_id = state.engine.delete_item(user.id, item_id).await?;
    state.publish_balance(user.id, plan_id).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Reorder the items of the category owning `item_id`.
pub async fn reorder(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<Reorder>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reorder_items(user.id, item_id, &payload.ids)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn publish_for_item(state: &ServerState, user_id: Uuid, item_id: Uuid) {
    match state.engine.item_plan_id(user_id, item_id).await {
        Ok(plan_id) => state.publish_balance(user_id, plan_id).await,
        Err(err) => tracing::warn!(%item_id, "budget update not published: {err}"),
    }
}
