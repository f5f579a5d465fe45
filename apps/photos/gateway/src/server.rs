//! Gateway initialization and lifecycle management
//!
//! This module handles all server setup:
//! - Tracing initialization
//! - Qdrant connection and collection bootstrap
//! - Embedding client setup
//! - Public and internal HTTP listeners
//! - Graceful shutdown and store connection release

use std::sync::Arc;

use axum::Router;
use domain_photos::{
    HttpEmbeddingConfig, HttpEmbeddingProvider, PhotoService, QdrantConfig,
    QdrantPhotoRepository, internal_router, public_router,
};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};

use crate::config::{GatewayConfig, ListenerConfig};

/// Run the gateway
///
/// This is the main entry point for server initialization. It:
/// 1. Sets up structured logging (env-aware: JSON for prod, pretty for dev)
/// 2. Connects to Qdrant and creates the collection if it is missing
/// 3. Builds the embedding client and the photo service
/// 4. Serves the public and internal routers until SIGINT/SIGTERM
/// 5. Closes the store connection once both listeners have drained
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The vector store is unreachable or the collection cannot be created
/// - A listener cannot be bound
/// - A server encounters a runtime error
pub async fn run() -> Result<()> {
    crate::tracing::install_color_eyre();

    let config = GatewayConfig::from_env().wrap_err("Failed to load gateway configuration")?;
    crate::tracing::init_tracing(&config.environment);

    let qdrant_config = QdrantConfig::from_env().wrap_err("Failed to load Qdrant configuration")?;

    let dimension = qdrant_config.vector_size as usize;

    info!("Connecting to Qdrant at {}...", qdrant_config.url);
    let repository = QdrantPhotoRepository::connect(qdrant_config)
        .await
        .wrap_err("Failed to initialize vector store")?;
    info!("Connected to Qdrant, collection '{}' ready", repository.collection());

    let embedding_config = HttpEmbeddingConfig::from_env()
        .wrap_err("Failed to load embedding configuration")?
        .with_dimension(dimension);
    let embedding = HttpEmbeddingProvider::new(embedding_config)
        .wrap_err("Failed to configure embedding client")?;

    let service = Arc::new(PhotoService::new(repository, Arc::new(embedding)));

    let public_app = with_tracing(Router::new().nest("/api/v1", public_router(service.clone())));
    let internal_app = with_tracing(internal_router(service.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let public = serve("public", &config.public, public_app, shutdown_rx.clone());
    let internal = serve("internal", &config.internal, internal_app, shutdown_rx);

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // A failing listener drops the other one with it.
    let served = tokio::try_join!(public, internal);

    match Arc::try_unwrap(service) {
        Ok(service) => service.shutdown(),
        Err(_) => warn!("Photo service still referenced at shutdown, connection left to drop"),
    }

    served?;

    info!("Gateway stopped");
    Ok(())
}

fn with_tracing(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

async fn serve(
    name: &'static str,
    listener_config: &ListenerConfig,
    app: Router,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = listener_config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {} listener to {}", name, addr))?;

    info!("{} API listening on {}", name, addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .wrap_err_with(|| format!("{} server failed", name))?;

    info!("{} API stopped", name);
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
