use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Desired lamp state carried by publish requests. Input is case-insensitive,
// output is normalized to uppercase ("ON"/"OFF").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LampState {
    On,
    Off,
}

impl LampState {
    // Anything other than "on"/"off" (in any casing) is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "on" => Some(LampState::On),
            "off" => Some(LampState::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LampState::On => "ON",
            LampState::Off => "OFF",
        }
    }
}

// Gateway error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("MQTT broker is not connected")]
    BrokerUnavailable,

    #[error("Failed to publish MQTT message: {0}")]
    PublishFailed(String),

    #[error("MQTT connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
