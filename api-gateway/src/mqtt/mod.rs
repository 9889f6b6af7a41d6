// MQTT connection management for the gateway.

pub mod client;

pub use client::MqttConnectionManager;
