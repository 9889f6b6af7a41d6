use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use lumen_shared::{GatewayError, LampState};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::error_response;
use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    // Optional at the serde level so that an empty body gets the same
    // rejection as an unknown value.
    pub status: Option<String>,
}

// Publish a lamp command to the topic named in the path. Validation happens
// before the broker check, and the broker check before any network call.
pub async fn publish_status(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let lamp_state = request
        .status
        .as_deref()
        .and_then(LampState::parse)
        .ok_or_else(|| {
            error_response(&GatewayError::InvalidRequest(
                r#"expected JSON body {"status": "on"} or {"status": "off"}"#.to_string(),
            ))
        })?;

    match state.mqtt.publish_lamp_state(&topic, lamp_state).await {
        Ok(payload) => {
            info!(
                "Published lamp command to topic '{}': {}",
                topic,
                lamp_state.as_str()
            );

            Ok(Json(json!({
                "message": "Command published via MQTT",
                "topic": payload.topic,
                "status": payload.status,
            })))
        }
        Err(e) => {
            error!("Failed to publish to topic '{}': {}", topic, e);
            Err(error_response(&e))
        }
    }
}
