pub mod health;
pub mod publish;

use axum::http::StatusCode;
use axum::response::Json;
use lumen_shared::GatewayError;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "lumen-api-gateway";

// Map a gateway error onto its HTTP status and JSON error body. Internal
// errors surface as a plain message, never as the underlying error object.
pub fn error_response(error: &GatewayError) -> (StatusCode, Json<Value>) {
    let status = match error {
        GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GatewayError::BrokerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::PublishFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GatewayError::Connection(_) | GatewayError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = json!({
        "status": "error",
        "message": error.to_string(),
    });

    (status, Json(body))
}
