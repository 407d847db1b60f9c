use std::sync::Arc;

use log::info;
use player_persistence_sea_orm::{create_db_pool, create_schema, players::PlayerRepositoryImpl};
use player_server_app::build_application;

mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    logs::init_logger().expect("Failed to initialize logger");

    let db = create_db_pool().await;
    if let Err(e) = create_schema(&db).await {
        log::error!("Failed to prepare players table: {}", e);
        return;
    }

    let player_repo = Arc::new(PlayerRepositoryImpl::with_connection(db));
    let app = Arc::new(build_application(player_repo));

    info!("Starting application");

    if let Err(e) = player_server_http_api::run(app, shutdown_signal()).await {
        log::error!("HTTP API failed: {}", e);
    }
}
