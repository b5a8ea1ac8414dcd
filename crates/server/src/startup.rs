use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use service::students::repo::seaorm::SeaOrmStudentStorageBroker;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Pick the storage backend named by `cfg.database` and wire the service over it.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    if cfg.database.is_memory() {
        warn!(event = "memory_storage", "no database configured, students are kept in process memory");
        return Ok(ServerState::in_memory());
    }

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    info!(event = "migrations_applied", "database schema up to date");

    Ok(ServerState::with_broker(SeaOrmStudentStorageBroker::new(db)))
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve `app` on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), StartupError> {
    axum::serve(listener, app)
        .await
        .map_err(|e| StartupError::Any(e.into()))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = cfg
        .server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!(%addr, "starting student registry server");
    serve(listener, app).await
}
