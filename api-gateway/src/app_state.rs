use chrono::{DateTime, Utc};
use lumen_shared::{now_utc, AppConfig};
use std::sync::Arc;

use crate::mqtt::MqttConnectionManager;

// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub mqtt: Arc<MqttConnectionManager>,
    pub config: Arc<AppConfig>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(mqtt: Arc<MqttConnectionManager>, config: Arc<AppConfig>) -> Self {
        Self {
            mqtt,
            config,
            started_at: now_utc(),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (now_utc() - self.started_at).num_seconds()
    }
}
