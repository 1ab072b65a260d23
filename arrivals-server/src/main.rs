use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use arrivals_server::config::{AppConfig, TIMEZONE};
use arrivals_server::mbta::MbtaClient;
use arrivals_server::refresh::{REFRESH_INTERVAL, Refresher, spawn_refresh_loop};
use arrivals_server::snapshot::{Snapshot, SnapshotStore};
use arrivals_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    if config.api_key.is_some() {
        info!("using MBTA API key");
    } else {
        warn!("MBTA_API_KEY not set, requests will be rate limited more aggressively");
    }

    let mbta_config = config.mbta_config();
    info!(
        stop = %mbta_config.stop_id,
        route = %mbta_config.route_id,
        base_url = %mbta_config.base_url,
        "configured MBTA client"
    );
    let client = MbtaClient::new(mbta_config).expect("Failed to create MBTA client");

    let store = SnapshotStore::new(Snapshot::empty(TIMEZONE));
    let refresher = Arc::new(Refresher::new(client.clone(), store.clone(), TIMEZONE));

    // Populate the snapshot before accepting traffic
    refresher.tick().await;

    spawn_refresh_loop(Arc::clone(&refresher), REFRESH_INTERVAL);

    let state = AppState::new(store, client);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!("Porter Square arrivals listening on http://{}", config.bind_addr);
    info!("  GET  /            - Arrivals board");
    info!("  GET  /stops       - Red Line stops");
    info!("  GET  /api/trains  - Arrivals as JSON");
    info!("  GET  /health      - Health check");

    axum::serve(listener, app).await.expect("Server error");
}
