use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;

use crate::utils::jwt::Claims;
use crate::AppState;

/// Server-sent change feed. Each event names the collection that changed;
/// clients re-fetch it. A `resync` event means some notifications were lost.
pub async fn stream(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.notifier.subscribe();
    let retry = state.config.sse_retry;

    tracing::debug!(user = %claims.username, "Change feed opened");

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            let event = match receiver.recv().await {
                Ok(change) => match Event::default().event("change").json_data(&change) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode change event");
                        continue;
                    }
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Change feed lagged, asking client to resync");
                    Event::default().event("resync").data(missed.to_string())
                }
                Err(RecvError::Closed) => return None,
            };

            return Some((Ok::<_, Infallible>(event.retry(retry)), receiver));
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
