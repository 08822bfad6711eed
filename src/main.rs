use quietrooms::{config::Config, index, res, rooms, storage::FileStorage, transcripts, AppState};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_minutes)));

    let storage = FileStorage::open(&config.data_dir)?;
    info!(data_dir = %storage.dir().display(), "room storage ready");
    let app_state = AppState::new(storage);

    let app = Router::new()
        .route("/", get(index::index))
        .route("/style.css", get(res::stylesheet))

        .nest("/r", rooms::router())
        .nest("/t", transcripts::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
