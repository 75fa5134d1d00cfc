//! Note and advice API endpoints

use api_types::{
    note::{AdviceList, NoteFilter, NoteInput, NoteList, NoteView},
    order::Reorder,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NoteKind, User};
use notifications::Payload;
use uuid::Uuid;

use crate::{
    ServerError,
    advisor::advise_or_fallback,
    server::ServerState,
    views::{map_note, note_kind},
};

/// Notes of a plan, optionally filtered with `?type=ai|user`.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
    Query(filter): Query<NoteFilter>,
) -> Result<Json<NoteList>, ServerError> {
    let notes = state
        .engine
        .list_notes(user.id, plan_id, filter.note_type.map(note_kind))
        .await?;

    Ok(Json(NoteList {
        notes: notes.into_iter().map(map_note).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<NoteInput>,
) -> Result<(StatusCode, Json<NoteView>), ServerError> {
    let note = state
        .engine
        .create_note(user.id, plan_id, &payload.content, note_kind(payload.note_type))
        .await?;

    Ok((StatusCode::CREATED, Json(map_note(note))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(note_id): Path<Uuid>,
    Json(payload): Json<NoteInput>,
) -> Result<Json<NoteView>, ServerError> {
    let note = state
        .engine
        .update_note(user.id, note_id, &payload.content, note_kind(payload.note_type))
        .await?;

    Ok(Json(map_note(note)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_note(user.id, note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(note_id): Path<Uuid>,
    Json(payload): Json<Reorder>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reorder_notes(user.id, note_id, &payload.ids)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Stored advisor notes of a plan.
pub async fn list_advices(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<AdviceList>, ServerError> {
    let notes = state
        .engine
        .list_notes(user.id, plan_id, Some(NoteKind::Ai))
        .await?;

    Ok(Json(AdviceList {
        advices: notes.into_iter().map(map_note).collect(),
    }))
}

/// Ask the advisor about a plan and replace its previous advice notes.
pub async fn generate_advices(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<AdviceList>, ServerError> {
    let detail = state.engine.plan_detail(user.id, plan_id).await?;
    let advices = advise_or_fallback(state.advisor.as_ref(), &detail).await;

    let notes = state
        .engine
        .replace_ai_notes(user.id, plan_id, advices)
        .await?;
    state.hub.publish(
        user.id,
        Payload::AiAdvices {
            plan_id,
            count: notes.len(),
        },
    );

    Ok(Json(AdviceList {
        advices: notes.into_iter().map(map_note).collect(),
    }))
}
