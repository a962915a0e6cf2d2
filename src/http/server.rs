use tokio::net::TcpListener;
use tracing::{info, warn};

use super::routes::{AppState, GRAPHQL_PATH, router};
use crate::config::ServerSettings;
use crate::error::{Result, ShelfError};
use crate::graphql::OperationPipeline;

/// Bind `settings.host:settings.port` and serve until Ctrl-C.
pub async fn serve(pipeline: OperationPipeline, settings: &ServerSettings) -> Result<()> {
    let addr = settings.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ShelfError::Server(format!("failed to bind {}: {}", addr, e)))?;
    serve_on(listener, pipeline, settings).await
}

/// Serve on an already bound listener.
pub async fn serve_on(
    listener: TcpListener,
    pipeline: OperationPipeline,
    settings: &ServerSettings,
) -> Result<()> {
    let local = listener.local_addr()?;
    info!("GraphQL endpoint: http://{}{}", local, GRAPHQL_PATH);

    let app = router(AppState::new(pipeline, settings));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            // Without a signal handler we simply run until killed.
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
