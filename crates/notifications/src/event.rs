//! Events delivered to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed body of an event.
///
/// Serialized adjacently tagged, so an [`Event`] reads
/// `{"type": "...", "data": {...}, "timestamp": "..."}` on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// First event of every subscription.
    Connected { user_id: Uuid },
    /// A plan or one of its items changed.
    BudgetUpdated {
        plan_id: Uuid,
        spent_cents: i64,
        remaining_cents: i64,
    },
    /// Advice generation finished, with or without the fallback tips.
    AiAdvices { plan_id: Uuid, count: usize },
}

impl Payload {
    /// Event name used as the SSE `event:` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::BudgetUpdated { .. } => "budget_updated",
            Self::AiAdvices { .. } => "ai_advices",
        }
    }
}

/// A payload stamped with its publish time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(flatten)]
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn now(payload: Payload) -> Self {
        Self {
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}
