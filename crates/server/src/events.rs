//! Server-sent event stream of the user's notifications.

use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use engine::User;
use tokio_stream::{Stream, StreamExt};

use crate::server::ServerState;

/// One `event: <type>` / `data: <json>` record per hub event.
///
/// The subscription lives inside the response body, so it is released as
/// soon as the client goes away.
pub async fn stream(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.hub.subscribe(user.id);
    tracing::debug!(user_id = %user.id, "event stream opened");

    let events = subscription.map(|event| Event::default().event(event.kind()).json_data(&event));

    Sse::new(events).keep_alive(KeepAlive::default())
}
