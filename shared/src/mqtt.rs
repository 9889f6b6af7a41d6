use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{GatewayError, LampState};

// MQTT quality-of-service levels. Lamp commands go out at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

// Connectivity of the single broker connection. Owned by the connection
// manager; HTTP handlers only ever read snapshots of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// Events reported by the broker event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerEvent {
    ConnAck,
    Disconnect,
    ConnectionError,
    Reconnecting,
}

impl ConnectionState {
    /// Transition table for broker events, total over all state/event pairs.
    pub fn apply(self, event: BrokerEvent) -> ConnectionState {
        match event {
            BrokerEvent::ConnAck => ConnectionState::Connected,
            BrokerEvent::Disconnect | BrokerEvent::ConnectionError => ConnectionState::Disconnected,
            BrokerEvent::Reconnecting => ConnectionState::Connecting,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

// JSON payload published to the lamp controller,
// e.g. {"topic":"lamp","status":"ON"}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampPayload {
    pub topic: String,
    pub status: LampState,
}

// Seam between the connection manager and the underlying MQTT client so that
// tests can substitute a fake broker.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [ConnectionState; 3] = [
        ConnectionState::Disconnected,
        ConnectionState::Connecting,
        ConnectionState::Connected,
    ];

    #[test]
    fn test_transitions_are_total() {
        for state in ALL_STATES {
            assert_eq!(state.apply(BrokerEvent::ConnAck), ConnectionState::Connected);
            assert_eq!(state.apply(BrokerEvent::Disconnect), ConnectionState::Disconnected);
            assert_eq!(
                state.apply(BrokerEvent::ConnectionError),
                ConnectionState::Disconnected
            );
            assert_eq!(
                state.apply(BrokerEvent::Reconnecting),
                ConnectionState::Connecting
            );
        }
    }

    #[test]
    fn test_reconnect_cycle() {
        // drop -> backoff -> retry -> success
        let state = ConnectionState::Connected;
        let state = state.apply(BrokerEvent::ConnectionError);
        assert_eq!(state, ConnectionState::Disconnected);
        let state = state.apply(BrokerEvent::Reconnecting);
        assert_eq!(state, ConnectionState::Connecting);
        let state = state.apply(BrokerEvent::ConnAck);
        assert_eq!(state, ConnectionState::Connected);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ConnectionState::Connected.as_str(), "connected");
        assert_eq!(ConnectionState::Connecting.as_str(), "connecting");
        assert_eq!(ConnectionState::Disconnected.as_str(), "disconnected");
    }

    #[test]
    fn test_lamp_payload_wire_format() {
        let payload = LampPayload {
            topic: "lamp".to_string(),
            status: LampState::On,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"topic":"lamp","status":"ON"}"#);
    }
}
