use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use taskboard_store::{Database, TaskRepo};

use crate::config::ServerConfig;
use crate::handlers::{self, AppState};

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(handlers::list_tasks))
        .route("/tasks/add", post(handlers::add_task))
        .route("/tasks/delete-many", delete(handlers::delete_many_tasks))
        .route("/tasks/{id}/edit", put(handlers::edit_task))
        .route("/tasks/{id}/complete", patch(handlers::complete_task))
        .route("/tasks/{id}/delete", delete(handlers::delete_task))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Create and start the server. Returns a handle carrying the bound port.
pub async fn start(config: ServerConfig, db: Database) -> Result<ServerHandle, std::io::Error> {
    let state = AppState::new(TaskRepo::new(db));
    let router = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "taskboard server started");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server,
    })
}

/// Handle returned by `start()` — keeps the serve task alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
}
