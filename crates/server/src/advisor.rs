//! Budget advice generation.
//!
//! A real model plugs in behind [`Advisor`]. The handler falls back to
//! [`FallbackAdvisor::tips`] whenever the configured advisor fails or comes
//! back empty, so advice requests always end with a set of notes.

use async_trait::async_trait;
use engine::PlanDetail;

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Advisor: Send + Sync {
    /// Short advice texts for the given plan snapshot.
    async fn advise(&self, plan: &PlanDetail) -> Result<Vec<String>, AdvisorError>;
}

/// Advisor returning three fixed budgeting tips.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackAdvisor;

impl FallbackAdvisor {
    pub fn tips() -> Vec<String> {
        vec![
            "Review mandatory and optional expenses and cut the unnecessary ones.".to_string(),
            "Keep a reserve of 5-10% of the budget for unexpected expenses.".to_string(),
            "Mark completed expenses weekly to notice overspending in time.".to_string(),
        ]
    }
}

#[async_trait]
impl Advisor for FallbackAdvisor {
    async fn advise(&self, _plan: &PlanDetail) -> Result<Vec<String>, AdvisorError> {
        Ok(Self::tips())
    }
}

/// Advice from `advisor`, or the fallback tips.
pub(crate) async fn advise_or_fallback(advisor: &dyn Advisor, plan: &PlanDetail) -> Vec<String> {
    let plan_id = plan.plan.id;
    match advisor.advise(plan).await {
        Ok(advices) => {
            let advices: Vec<String> = advices
                .into_iter()
                .filter(|advice| !advice.trim().is_empty())
                .collect();
            if advices.is_empty() {
                tracing::warn!(%plan_id, "advisor returned nothing, fallback used");
                FallbackAdvisor::tips()
            } else {
                tracing::info!(%plan_id, count = advices.len(), "advices generated");
                advices
            }
        }
        Err(err) => {
            tracing::warn!(%plan_id, "advices fallback used: {err}");
            FallbackAdvisor::tips()
        }
    }
}
