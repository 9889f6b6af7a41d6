use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use lumen_shared::load_config;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

mod app_state;
mod handlers;
mod middleware;
mod mqtt;

use app_state::AppState;
use mqtt::MqttConnectionManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    // Load configuration
    let config = load_config()?;
    info!("Configuration loaded successfully");

    // Create the MQTT connection manager and start its event loop. The HTTP
    // layer only ever reads its state; the event loop owns all transitions.
    let (mqtt_manager, event_loop) = MqttConnectionManager::new(&config.mqtt);
    let mqtt_manager = Arc::new(mqtt_manager);
    mqtt_manager.start(event_loop);
    info!(
        "Connecting to MQTT broker at {}:{} (lamp topic '{}')",
        config.mqtt.broker_host, config.mqtt.broker_port, config.mqtt.publish_topic
    );

    // Create application state
    let app_state = AppState::new(mqtt_manager, Arc::new(config));
    let addr: SocketAddr = format!(
        "{}:{}",
        app_state.config.server.host, app_state.config.server.port
    )
    .parse()?;

    // Build the application
    let app = create_app(app_state);

    // Start the server
    info!("API Gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(app_state: AppState) -> Router {
    // Create middleware stack
    let middleware_layer = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .into_inner();

    Router::new()
        // Health check route
        .route("/api/health", get(handlers::health::health_check))
        // Publish route
        .route("/api/publish/:topic", post(handlers::publish::publish_status))
        .layer(middleware_layer)
        .with_state(app_state)
}
