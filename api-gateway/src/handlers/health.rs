use axum::{extract::State, http::StatusCode, response::Json};
use lumen_shared::{now_utc, ConnectionState};
use serde_json::{json, Value};

use super::SERVICE_NAME;
use crate::app_state::AppState;

// Health check: a pure read of the broker connection snapshot. 200 only while
// the MQTT connection is up.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mqtt_state = state.mqtt.state().await;
    let mqtt_reconnects = state.mqtt.reconnect_count().await;
    let timestamp = now_utc().to_rfc3339();

    if mqtt_state == ConnectionState::Connected {
        let body = json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "mqtt_status": mqtt_state.as_str(),
            "mqtt_reconnects": mqtt_reconnects,
            "timestamp": timestamp,
            "uptime_seconds": state.uptime_seconds(),
        });

        (StatusCode::OK, Json(body))
    } else {
        let body = json!({
            "status": "error",
            "service": SERVICE_NAME,
            "mqtt_status": mqtt_state.as_str(),
            "mqtt_reconnects": mqtt_reconnects,
            "timestamp": timestamp,
            "uptime_seconds": state.uptime_seconds(),
            "error_details": "No active connection to the MQTT broker",
        });

        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}
