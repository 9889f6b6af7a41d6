// Shared types and utilities for the Lumen lamp gateway.

pub mod config;
pub mod mqtt;
pub mod types;

pub use config::{load_config, AppConfig, MqttConfig, ServerConfig};
pub use mqtt::{BrokerClient, BrokerEvent, ConnectionState, LampPayload, QoS};
pub use types::{now_utc, GatewayError, LampState};
