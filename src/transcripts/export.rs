use axum::{
    debug_handler,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{res, storage::RoomStorage, transcript, AppResult, SharedStorage};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn export(
    Path(id): Path<String>,
    State(storage): State<SharedStorage>,
) -> AppResult<Response> {
    let rooms = RoomStorage::new(&*storage.lock().await).load_rooms();
    let Some(room) = rooms.iter().find(|r| r.id == id) else {
        return res::sorry("transcript");
    };

    let disposition = format!("attachment; filename=\"{}\"", transcript::file_name(room));
    tracing::info!(room_id = %room.id, "transcript exported");
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        transcript::render(room),
    )
        .into_response())
}
