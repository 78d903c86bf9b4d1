//! Doodleguess realtime server (Socket.IO)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use socketioxide::SocketIo;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actors;
mod config;
mod handlers;
mod housekeeper;
mod registry;
mod state;

use config::Config;
use registry::RoomRegistry;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doodleguess_realtime=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let db = doodleguess_db::create_pool(&config.database_url).await?;
    tracing::info!("connected to database");

    let registry = RoomRegistry::new(db.clone());
    let state = AppState::new(db, Arc::clone(&registry));

    let (socket_layer, io) = SocketIo::builder().with_state(state).build_layer();
    // The registry needed `io` to hand to room actors, but `io` only
    // exists once the layer above is built from `state`, which already
    // holds the registry — so it's wired up after the fact instead.
    registry.set_io(io.clone());

    registry.bootstrap(config.rehydration_retention_secs).await;

    io.ns("/", handlers::on_connect);

    tokio::spawn(housekeeper::run(
        Arc::clone(&registry),
        config.housekeeper_interval_secs,
        config.stale_room_secs,
    ));

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .layer(ServiceBuilder::new().layer(socket_layer).layer(TraceLayer::new_for_http()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "realtime server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(io)).await?;

    Ok(())
}

/// Waits for Ctrl+C (or SIGTERM, under Unix) and broadcasts a shutdown
/// notice to every connected client before the listener stops accepting.
async fn shutdown_signal(io: SocketIo) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down, notifying connected clients");
    io.emit(
        doodleguess_protocol::socket::events::server::SERVER_SHUTDOWN,
        &serde_json::json!({ "message": "server is restarting" }),
    )
    .ok();
}
