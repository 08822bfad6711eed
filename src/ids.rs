use rand::{distr::Alphanumeric, Rng};
use time::OffsetDateTime;
use uuid::Uuid;

pub const ROOM_CODE_LEN: usize = 6;

/// Time-ordered unique id, used for rooms, users and messages alike.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Short shareable code. Not checked against existing rooms; callers live with collisions.
pub fn new_room_code() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(ROOM_CODE_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

/// Trims and uppercases whatever the user typed as a room code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
