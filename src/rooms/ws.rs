use axum::{
    debug_handler,
    extract::{ws::Message, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tower_sessions::Session;

use crate::{session::load_seat, AppResult, AppState, Events};

/// Pushes a JSON change notice whenever the caller's active room is written.
/// Pages reload on any notice; nothing is delivered besides the nudge.
#[debug_handler(state = AppState)]
pub async fn room_ws(
    State(events): State<Events>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(room_id) = load_seat(&session).await?.active_room_id else {
        return Ok(axum::http::StatusCode::NOT_FOUND.into_response());
    };

    Ok(ws.on_upgrade(move |stream| async move {
        let mut rx = events.subscribe();
        let (mut sender, mut receiver) = stream.split();

        let mut notify_task = tokio::spawn(async move {
            loop {
                let text = match rx.recv().await {
                    Ok(event) if event.room_id == room_id => {
                        serde_json::to_string(&event).unwrap_or_default()
                    }
                    Ok(_) => continue,
                    // missed some; any of them may have been ours
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "websocket listener lagged");
                        r#"{"kind":"lagged"}"#.to_owned()
                    }
                    Err(RecvError::Closed) => break,
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        });

        // drain the client side until it goes away
        let mut recv_task = tokio::spawn(async move {
            while let Some(Ok(msg)) = receiver.next().await {
                if matches!(msg, Message::Close(_)) {
                    break;
                }
            }
        });

        tokio::select! {
            _ = &mut notify_task => recv_task.abort(),
            _ = &mut recv_task => notify_task.abort(),
        };
    }))
}
