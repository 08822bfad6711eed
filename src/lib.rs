pub mod config;
pub mod ids;
pub mod index;
pub mod model;
pub mod res;
pub mod rooms;
pub mod session;
pub mod storage;
pub mod store;
pub mod transcript;
pub mod transcripts;

use std::sync::Arc;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}};
use tokio::sync::{broadcast, Mutex};

use storage::FileStorage;
use store::StoreEvent;

pub type SharedStorage = Arc<Mutex<FileStorage>>;
pub type Events = broadcast::Sender<StoreEvent>;

#[derive(Clone, FromRef)]
pub struct AppState {
    /// One lock around storage: every store operation reads, merges and writes under it.
    pub storage: SharedStorage,
    pub events: Events,
}

impl AppState {
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            events: broadcast::channel(64).0,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// What the browser gets: the outermost message, no causes, no backtrace.
    fn public_message(&self) -> String {
        self.0.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {:#}\n{}", self.0, self.0.backtrace());
        (StatusCode::INTERNAL_SERVER_ERROR, self.public_message()).into_response()
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(anyhow::Error::from(err))
    }
}

/// Escapes text for HTML bodies and attributes. Braces are escaped too so user
/// text can never be mistaken for a template placeholder.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders message Markdown. Raw HTML in the source is shown as text.
pub fn markdown_to_html(source: &str) -> String {
    use pulldown_cmark::{Event, Options, Parser};

    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output.replace('{', "&#123;").replace('}', "&#125;")
}
