use anyhow::Result;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mqtt: MqttConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive: u64,
    pub clean_session: bool,
    pub reconnect_interval_ms: u64,
    // Conventional topic the lamp controller listens on. The publish route's
    // path segment selects the actual topic per request.
    pub publish_topic: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            mqtt: MqttConfig {
                broker_host: "127.0.0.1".to_string(),
                broker_port: 1883,
                client_id: format!("lumen-gateway-{}", Uuid::new_v4()),
                username: None,
                password: None,
                keep_alive: 60,
                clean_session: true,
                reconnect_interval_ms: 5000,
                publish_topic: "lamp".to_string(),
            },
        }
    }
}

pub fn load_config() -> Result<AppConfig> {
    // Load .env file if present
    dotenv().ok();

    let defaults = AppConfig::default();

    let config = AppConfig {
        server: ServerConfig {
            host: env_or("SERVER_HOST", defaults.server.host),
            port: env_parse_or("SERVER_PORT", defaults.server.port)?,
        },
        mqtt: MqttConfig {
            broker_host: env_or("MQTT_BROKER_HOST", defaults.mqtt.broker_host),
            broker_port: env_parse_or("MQTT_BROKER_PORT", defaults.mqtt.broker_port)?,
            client_id: env_or("MQTT_CLIENT_ID", defaults.mqtt.client_id),
            username: env::var("MQTT_USERNAME").ok(),
            password: env::var("MQTT_PASSWORD").ok(),
            keep_alive: env_parse_or("MQTT_KEEP_ALIVE", defaults.mqtt.keep_alive)?,
            clean_session: env_parse_or("MQTT_CLEAN_SESSION", defaults.mqtt.clean_session)?,
            reconnect_interval_ms: env_parse_or(
                "MQTT_RECONNECT_INTERVAL_MS",
                defaults.mqtt.reconnect_interval_ms,
            )?,
            publish_topic: env_or("MQTT_PUBLISH_TOPIC", defaults.mqtt.publish_topic),
        },
    };

    validate_config(&config)?;

    Ok(config)
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn validate_config(config: &AppConfig) -> Result<()> {
    if config.mqtt.broker_host.is_empty() {
        return Err(anyhow::anyhow!("MQTT broker host cannot be empty"));
    }

    if config.mqtt.publish_topic.is_empty() {
        return Err(anyhow::anyhow!("MQTT publish topic cannot be empty"));
    }

    if config.mqtt.reconnect_interval_ms == 0 {
        return Err(anyhow::anyhow!("MQTT reconnect interval must be positive"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.mqtt.broker_host, "127.0.0.1");
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.mqtt.publish_topic, "lamp");
        assert_eq!(config.mqtt.reconnect_interval_ms, 5000);
        assert!(config.mqtt.client_id.starts_with("lumen-gateway-"));
        assert!(config.mqtt.clean_session);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_fields() {
        let mut config = AppConfig::default();
        config.mqtt.broker_host = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.mqtt.publish_topic = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.mqtt.reconnect_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }
}
