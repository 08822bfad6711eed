use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    index::index_page,
    session::{load_seat, open_store, save_seat},
    AppResult, AppState, Events, SharedStorage,
};

#[derive(Debug, Deserialize)]
pub(crate) struct JoinQuery {
    code: String,
    user_name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn join_room(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,

    Form(JoinQuery { code, user_name }): Form<JoinQuery>,
) -> AppResult<Response> {
    let seat = load_seat(&session).await?;
    let storage = storage.lock().await;
    let mut store = open_store(&storage, &events, seat);

    if !store.join_room(&code, &user_name) {
        return Ok(index_page(
            &store,
            Some("Couldn't join: the code doesn't match an open room, or that name is already in use there."),
        )
        .into_response());
    }

    save_seat(&session, &store.seat()).await?;
    Ok(Redirect::to("/r").into_response())
}
