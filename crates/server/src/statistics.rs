//! Statistics API endpoints

use api_types::{
    category::SpendingList,
    stats::{MonthlyComparison, MonthsQuery, Overview},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use engine::User;
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{map_month, map_spending},
};

const DEFAULT_COMPARISON_MONTHS: u32 = 6;

/// Plan counts and money totals of the user.
pub async fn overview(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Overview>, ServerError> {
    let today = Utc::now().date_naive();
    let overview = state.engine.overview(user.id, today).await?;

    Ok(Json(Overview {
        total_plans: overview.total_plans,
        active_plans: overview.active_plans,
        archived_plans: overview.archived_plans,
        total_budget_cents: overview.total_budget_cents,
        total_spent_cents: overview.total_spent_cents,
    }))
}

/// Completed and planned amounts per category, in category order.
pub async fn spending(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<SpendingList>, ServerError> {
    let spending = state.engine.spending_by_category(user.id, plan_id).await?;

    Ok(Json(SpendingList {
        categories: spending.into_iter().map(map_spending).collect(),
    }))
}

/// Budget against completed spend for the latest months, newest first.
///
/// `?months=N` defaults to 6 and is capped at 24.
pub async fn monthly_comparison(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<MonthsQuery>,
) -> Result<Json<MonthlyComparison>, ServerError> {
    let months = match query.months.as_deref().filter(|raw| !raw.is_empty()) {
        None => DEFAULT_COMPARISON_MONTHS,
        Some(raw) => parse_months(raw)?,
    };
    let totals = state.engine.monthly_comparison(user.id, months).await?;

    Ok(Json(MonthlyComparison {
        months: totals.into_iter().map(map_month).collect(),
    }))
}

fn parse_months(raw: &str) -> Result<u32, ServerError> {
    match raw.trim().parse::<i64>() {
        Ok(months) if months > 0 => Ok(u32::try_from(months).unwrap_or(u32::MAX)),
        _ => Err(ServerError::Generic(format!("invalid months: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_must_be_a_positive_integer() {
        assert_eq!(parse_months("3").ok(), Some(3));
        assert_eq!(parse_months("99999999999").ok(), Some(u32::MAX));
        for raw in ["0", "-2", "six", "1.5"] {
            assert!(parse_months(raw).is_err(), "{raw}");
        }
    }
}
