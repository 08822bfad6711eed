use axum::{debug_handler, extract::State, response::Redirect};
use tower_sessions::Session;

use crate::{
    session::{load_seat, open_store, save_seat},
    AppResult, AppState, Events, SharedStorage,
};

#[debug_handler(state = AppState)]
pub(crate) async fn leave_room(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,
) -> AppResult<Redirect> {
    let seat = load_seat(&session).await?;
    let storage = storage.lock().await;
    let mut store = open_store(&storage, &events, seat);

    store.leave_room();

    save_seat(&session, &store.seat()).await?;
    Ok(Redirect::to("/"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn end_room(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,
) -> AppResult<Redirect> {
    let seat = load_seat(&session).await?;
    let ended_id = seat.active_room_id.clone();
    let storage = storage.lock().await;
    let mut store = open_store(&storage, &events, seat);

    store.end_room();

    save_seat(&session, &store.seat()).await?;
    match ended_id {
        Some(id) if store.active_room().is_none() => Ok(Redirect::to(&format!("/t/{id}"))),
        _ => Ok(Redirect::to("/r")),
    }
}
