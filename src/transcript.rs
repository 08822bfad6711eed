use time::{macros::format_description, OffsetDateTime};

use crate::model::ChatRoom;

/// Epoch millis to `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|t| t.format(format).ok())
        .unwrap_or_else(|| ms.to_string())
}

fn format_date(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
        .ok()
        .and_then(|t| t.format(format).ok())
        .unwrap_or_else(|| "unknown-date".to_owned())
}

/// Line breaks inside a message are written as a literal `\n` so each message stays on one line.
fn single_line(content: &str) -> String {
    content.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n")
}

/// One `[timestamp] sender: content` line per message, in log order.
pub fn render(room: &ChatRoom) -> String {
    room.messages
        .iter()
        .map(|m| {
            format!(
                "[{}] {}: {}\n",
                format_timestamp(m.timestamp),
                m.sender_display_char,
                single_line(&m.content)
            )
        })
        .collect()
}

pub fn file_name(room: &ChatRoom) -> String {
    format!("chat-{}-{}.txt", room.code, format_date(room.created_at))
}
