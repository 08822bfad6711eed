use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    index::index_page,
    session::{load_seat, open_store, save_seat},
    AppResult, AppState, Events, SharedStorage,
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomQuery {
    name: String,
    host_name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,

    Form(NewRoomQuery { name, host_name }): Form<NewRoomQuery>,
) -> AppResult<Response> {
    let seat = load_seat(&session).await?;
    let storage = storage.lock().await;
    let mut store = open_store(&storage, &events, seat);

    if store.create_room(&name, &host_name).is_none() {
        return Ok(index_page(&store, Some("Give the room a name and tell us yours.")).into_response());
    }

    save_seat(&session, &store.seat()).await?;
    Ok(Redirect::to("/r").into_response())
}
