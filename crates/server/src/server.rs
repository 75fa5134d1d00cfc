use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use notifications::{Hub, Payload};
use uuid::Uuid;

use std::sync::Arc;

use crate::{
    Advisor, FallbackAdvisor, categories, events, items, notes, plans, statistics, user,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub hub: Hub,
    pub advisor: Arc<dyn Advisor>,
}

impl ServerState {
    /// State answering advice requests with the fixed fallback tips.
    pub fn new(engine: Engine, hub: Hub) -> Self {
        Self {
            engine: Arc::new(engine),
            hub,
            advisor: Arc::new(FallbackAdvisor),
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn Advisor>) -> Self {
        self.advisor = advisor;
        self
    }

    /// Push the current balance of `plan_id` to the user's subscribers.
    ///
    /// Runs after the mutation committed, so a failure here only loses the
    /// notification.
    pub(crate) async fn publish_balance(&self, user_id: Uuid, plan_id: Uuid) {
        match self.engine.plan_balance(user_id, plan_id).await {
            Ok(balance) => {
                self.hub.publish(
                    user_id,
                    Payload::BudgetUpdated {
                        plan_id,
                        spent_cents: balance.spent_cents,
                        remaining_cents: balance.remaining_cents,
                    },
                );
            }
            Err(err) => tracing::warn!(%plan_id, "budget update not published: {err}"),
        }
    }
}

/// Resolve HTTP Basic credentials (`email:password`) to a user.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = match state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
    {
        Ok(user) => user,
        Err(EngineError::Database(err)) => {
            tracing::error!("database error during authentication: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/me", get(user::me))
        .route("/plans", get(plans::list_active).post(plans::create))
        .route("/plans/archived", get(plans::list_archived))
        .route("/plans/generated", post(plans::create_generated))
        .route(
            "/plans/{id}",
            get(plans::detail).put(plans::update).delete(plans::delete),
        )
        .route("/plans/{id}/duplicate", post(plans::duplicate))
        .route("/plans/{id}/categories", post(categories::create))
        .route(
            "/plans/{id}/categories/{category_id}/items",
            post(items::create),
        )
        .route("/plans/{id}/notes", get(notes::list).post(notes::create))
        .route(
            "/plans/{id}/advices",
            get(notes::list_advices).post(notes::generate_advices),
        )
        .route("/plans/{id}/spending", get(statistics::spending))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/categories/{id}/order", put(categories::reorder))
        .route("/items/{id}", put(items::update).delete(items::delete))
        .route("/items/{id}/toggle", patch(items::toggle))
        .route("/items/{id}/priority", patch(items::set_priority))
        .route("/items/{id}/order", put(items::reorder))
        .route("/notes/{id}", put(notes::update).delete(notes::delete))
        .route("/notes/{id}/order", put(notes::reorder))
        .route("/stats/overview", get(statistics::overview))
        .route(
            "/stats/monthly-comparison",
            get(statistics::monthly_comparison),
        )
        .route("/events", get(events::stream))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/users", post(user::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
