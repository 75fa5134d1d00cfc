use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Note, NoteKind, ResultEngine, notes, util::normalize_content};

use super::{
    Engine,
    access::PlanChild,
    plans::{insert_note, load_notes},
    with_tx,
};

impl Engine {
    /// Notes of a plan in position order, optionally only one kind.
    pub async fn list_notes(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        kind: Option<NoteKind>,
    ) -> ResultEngine<Vec<Note>> {
        with_tx!(self, |db_tx| {
            self.require_plan(&db_tx, plan_id, user_id).await?;
            load_notes(&db_tx, plan_id, kind)
                .await?
                .into_iter()
                .map(Note::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Append a note at the end of the plan's notes.
    pub async fn create_note(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        content: &str,
        kind: NoteKind,
    ) -> ResultEngine<Note> {
        let content = normalize_content(content)?;

        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            let position = self.next_position::<notes::Entity>(&db_tx, plan_id).await?;
            let model = insert_note(&db_tx, plan_id, &content, kind, position, Utc::now()).await?;
            Note::try_from(model)
        })
    }

    pub async fn update_note(
        &self,
        user_id: Uuid,
        note_id: Uuid,
        content: &str,
        kind: NoteKind,
    ) -> ResultEngine<Note> {
        let content = normalize_content(content)?;

        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Note, note_id, user_id)
                .await?;
            let model = self.require_note(&db_tx, note_id, user_id).await?;
            let mut active: notes::ActiveModel = model.into();
            active.content = ActiveValue::Set(content);
            active.note_type = ActiveValue::Set(kind.as_str().to_string());
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Note::try_from(model)
        })
    }

    pub async fn delete_note(&self, user_id: Uuid, note_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Note, note_id, user_id)
                .await?;
            let model = self.require_note(&db_tx, note_id, user_id).await?;
            notes::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Reorder every note of the plan owning `anchor_id`.
    pub async fn reorder_notes(
        &self,
        user_id: Uuid,
        anchor_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Note, anchor_id, user_id)
                .await?;
            let anchor = self.require_note(&db_tx, anchor_id, user_id).await?;
            self.apply_order::<notes::Entity>(&db_tx, anchor.plan_id, ordered_ids)
                .await
        })
    }

    /// Swap the plan's advisor notes for `drafts`.
    ///
    /// User notes are kept; the new notes are appended after them.
    pub async fn replace_ai_notes(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        drafts: Vec<String>,
    ) -> ResultEngine<Vec<Note>> {
        let contents = drafts
            .iter()
            .map(|content| normalize_content(content))
            .collect::<ResultEngine<Vec<_>>>()?;

        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            notes::Entity::delete_many()
                .filter(notes::Column::PlanId.eq(plan_id))
                .filter(notes::Column::NoteType.eq(NoteKind::Ai.as_str()))
                .exec(&db_tx)
                .await?;

            let first = self.next_position::<notes::Entity>(&db_tx, plan_id).await?;
            let now = Utc::now();
            let mut created = Vec::with_capacity(contents.len());
            for (offset, content) in contents.iter().enumerate() {
                let model = insert_note(
                    &db_tx,
                    plan_id,
                    content,
                    NoteKind::Ai,
                    first + offset as i32,
                    now,
                )
                .await?;
                created.push(Note::try_from(model)?);
            }
            Ok(created)
        })
    }
}
