//! Budget plan API endpoints

use api_types::plan::{GeneratedPlanNew, PlanDetailView, PlanList, PlanNew, PlanUpdate, PlanView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CategoryDraft, ItemDraft, NewPlanCmd, NoteDraft, UpdatePlanCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{category_kind, map_detail, map_plan, map_summary, note_kind, priority},
};

fn new_plan_cmd(payload: PlanNew) -> NewPlanCmd {
    let cmd = NewPlanCmd::new(
        payload.title,
        payload.budget_cents,
        payload.period_start,
        payload.period_end,
    );
    match payload.background_color {
        Some(color) => cmd.background_color(color),
        None => cmd,
    }
}

/// Plans whose period has not ended yet, newest first.
pub async fn list_active(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<PlanList>, ServerError> {
    let today = Utc::now().date_naive();
    let plans = state.engine.list_active_plans(user.id, today).await?;

    Ok(Json(PlanList {
        plans: plans.into_iter().map(map_summary).collect(),
    }))
}

/// Plans whose period is over, latest end first.
pub async fn list_archived(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<PlanList>, ServerError> {
    let today = Utc::now().date_naive();
    let plans = state.engine.list_archived_plans(user.id, today).await?;

    Ok(Json(PlanList {
        plans: plans.into_iter().map(map_summary).collect(),
    }))
}

/// Create a plan with the default category catalog.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<PlanNew>,
) -> Result<(StatusCode, Json<PlanView>), ServerError> {
    let plan = state.engine.create_plan(user.id, new_plan_cmd(payload)).await?;
    state.publish_balance(user.id, plan.id).await;

    Ok((StatusCode::CREATED, Json(map_plan(plan))))
}

/// Create a plan from a generated tree of categories, items and notes.
pub async fn create_generated(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<GeneratedPlanNew>,
) -> Result<(StatusCode, Json<PlanDetailView>), ServerError> {
    let categories = payload
        .categories
        .into_iter()
        .map(|category| {
            category.items.into_iter().fold(
                CategoryDraft::new(category.title, category_kind(category.category_type)),
                |draft, item| {
                    draft.item(ItemDraft::new(
                        item.title,
                        item.amount_cents,
                        priority(item.priority_color),
                    ))
                },
            )
        })
        .collect();
    let notes = payload
        .notes
        .into_iter()
        .map(|note| NoteDraft::new(note.content, note_kind(note.note_type)))
        .collect();

    let plan = state
        .engine
        .create_plan_with_details(
            user.id,
            new_plan_cmd(payload.plan).ai_generated(true),
            categories,
            notes,
        )
        .await?;
    state.publish_balance(user.id, plan.id).await;

    let detail = state.engine.plan_detail(user.id, plan.id).await?;
    Ok((StatusCode::CREATED, Json(map_detail(detail))))
}

pub async fn detail(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<PlanDetailView>, ServerError> {
    let detail = state.engine.plan_detail(user.id, plan_id).await?;
    Ok(Json(map_detail(detail)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<PlanUpdate>,
) -> Result<Json<PlanView>, ServerError> {
    let mut cmd = UpdatePlanCmd::new(
        payload.title,
        payload.budget_cents,
        payload.period_start,
        payload.period_end,
    );
    cmd.background_color = payload.background_color;
    cmd.is_ai_generated = payload.is_ai_generated;

    let plan = state.engine.update_plan(user.id, plan_id, cmd).await?;
    state.publish_balance(user.id, plan.id).await;

    Ok(Json(map_plan(plan)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_plan(user.id, plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deep copy of a plan under a "Copy of" title.
pub async fn duplicate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<(StatusCode, Json<PlanView>), ServerError> {
    let plan = state.engine.duplicate_plan(user.id, plan_id).await?;
    state.publish_balance(user.id, plan.id).await;

    Ok((StatusCode::CREATED, Json(map_plan(plan))))
}
