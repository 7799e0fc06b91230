//! Axum router and server startup.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Result;
use crate::inventory::Inventory;

use handlers::AppState;

/// Build the request surface:
///
/// | method | path | operation |
/// |---|---|---|
/// | GET | `/` | list records |
/// | POST | `/` | add record |
/// | PUT | `/{line}` | update record |
/// | DELETE | `/{line}` | delete record |
/// | GET | `/backups` | list backups |
/// | POST | `/backups/{name}` | restore backup |
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_records)
                .post(handlers::add_record)
                .put(handlers::put_without_line)
                .delete(handlers::delete_without_line)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/backups",
            get(handlers::list_backups)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/backups/{name}",
            post(handlers::restore_backup)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/{line}",
            put(handlers::update_record)
                .delete(handlers::delete_record)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Open the inventory and serve it until the process is stopped.
pub async fn serve(config: Config) -> Result<()> {
    let inventory = Inventory::open(&config)?;
    let state = AppState::new(Arc::new(inventory), config.io_timeout());
    let app = build_router(state, config.settings.server.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.settings.server.listen_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        db = %config.db_path.display(),
        "devicedb server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
