use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;
use crate::config::Config;
use crate::routes::{create_router, AppState};
use tokio::net::TcpListener;
use tokio::signal;

mod config;
mod cors;
mod error;
mod routes;
mod upstream;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    info!("Ollama proxy starting on port {}", config.port);
    info!("Proxying to: {}", config.ollama_url);
    if config.cors_permissive {
        info!("CORS: permissive, any origin is mirrored");
    } else {
        info!("CORS: allowed origins {:?}", config.allowed_origins);
    }
    info!("Upstream timeout: {:?}", config.upstream_timeout);

    let addr = config.listen_addr();
    let state = AppState::new(config)?;
    let app = create_router(state)?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
