use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use advisor::{Advisor, AdvisorError, FallbackAdvisor};
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod advisor;
mod categories;
mod events;
mod items;
mod notes;
mod plans;
mod server;
mod statistics;
mod user;
mod views;

pub mod types {
    pub mod user {
        pub use api_types::user::{UserNew, UserView};
    }

    pub mod plan {
        pub use api_types::plan::{
            Balance, CategoryTree, GeneratedPlanNew, ItemTree, NoteTree, PlanDetailView, PlanList,
            PlanNew, PlanSummaryView, PlanUpdate, PlanView,
        };
    }

    pub mod category {
        pub use api_types::category::{
            CategoryDetailView, CategoryInput, CategorySpendingView, CategoryView, SpendingList,
        };
    }

    pub mod item {
        pub use api_types::item::{ItemNew, ItemPriority, ItemToggle, ItemUpdate, ItemView};
    }

    pub mod note {
        pub use api_types::note::{AdviceList, NoteFilter, NoteInput, NoteList, NoteView};
    }

    pub mod stats {
        pub use api_types::stats::{MonthTotals, MonthlyComparison, MonthsQuery, Overview};
    }

    pub use api_types::order::Reorder;
    pub use api_types::{CategoryType, NoteType, PriorityColor};
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidInput(_) | EngineError::BudgetExceeded(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidInput("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn budget_exceeded_maps_to_400() {
        let res = ServerError::from(EngineError::BudgetExceeded("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_maps_to_500_without_details() {
        let err = EngineError::Database(sea_orm_err());
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_for_engine_error(err), "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    fn sea_orm_err() -> sea_orm::DbErr {
        sea_orm::DbErr::Custom("connection reset".to_string())
    }
}
