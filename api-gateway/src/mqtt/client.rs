use async_trait::async_trait;
use lumen_shared::{
    BrokerClient, BrokerEvent, ConnectionState, GatewayError, LampPayload, LampState, MqttConfig,
    QoS,
};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

// rumqttc-backed broker client used outside of tests.
struct RumqttcBroker {
    client: AsyncClient,
}

#[async_trait]
impl BrokerClient for RumqttcBroker {
    async fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), GatewayError> {
        self.client
            .publish(topic, map_qos(qos), retain, payload)
            .await
            .map_err(|e| GatewayError::PublishFailed(e.to_string()))
    }
}

fn map_qos(qos: QoS) -> rumqttc::QoS {
    match qos {
        QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
        QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
        QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
    }
}

// Owns the single broker connection shared by all HTTP requests. The event
// loop task is the only writer of the connection state; handlers read
// snapshots and issue publish calls.
pub struct MqttConnectionManager {
    client: Arc<dyn BrokerClient>,
    state: Arc<RwLock<ConnectionState>>,
    reconnect_count: Arc<RwLock<u32>>,
    reconnect_interval: Duration,
}

impl MqttConnectionManager {
    pub fn new(config: &MqttConfig) -> (Self, EventLoop) {
        let mut mqtt_options = MqttOptions::new(
            config.client_id.clone(),
            &config.broker_host,
            config.broker_port,
        );

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            mqtt_options.set_credentials(username, password);
        }

        mqtt_options.set_keep_alive(Duration::from_secs(config.keep_alive));
        mqtt_options.set_clean_session(config.clean_session);

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);

        let manager = Self {
            client: Arc::new(RumqttcBroker { client }),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            reconnect_count: Arc::new(RwLock::new(0)),
            reconnect_interval: Duration::from_millis(config.reconnect_interval_ms),
        };

        (manager, event_loop)
    }

    // Constructor for tests: substitutes the broker client behind the trait
    // seam and skips the event loop.
    #[cfg(test)]
    pub fn with_client(client: Arc<dyn BrokerClient>, initial_state: ConnectionState) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(initial_state)),
            reconnect_count: Arc::new(RwLock::new(0)),
            reconnect_interval: Duration::from_millis(5000),
        }
    }

    // Spawn the broker event loop. Non-blocking; the HTTP layer keeps serving
    // while the connection is being established.
    pub fn start(&self, event_loop: EventLoop) {
        let state = self.state.clone();
        let reconnect_count = self.reconnect_count.clone();
        let reconnect_interval = self.reconnect_interval;

        tokio::spawn(async move {
            Self::transition(&state, BrokerEvent::Reconnecting).await;
            Self::run_event_loop(event_loop, state, reconnect_count, reconnect_interval).await;
        });
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    pub async fn reconnect_count(&self) -> u32 {
        *self.reconnect_count.read().await
    }

    // Publish a lamp command. Rejected immediately while not connected; no
    // queuing and no retry on the caller's behalf.
    pub async fn publish_lamp_state(
        &self,
        topic: &str,
        lamp_state: LampState,
    ) -> Result<LampPayload, GatewayError> {
        if !self.is_connected().await {
            return Err(GatewayError::BrokerUnavailable);
        }

        let payload = LampPayload {
            topic: topic.to_string(),
            status: lamp_state,
        };
        let bytes = serde_json::to_vec(&payload)?;

        self.client
            .publish(topic, QoS::AtMostOnce, false, bytes)
            .await?;

        debug!("Published lamp payload to topic: {}", topic);
        Ok(payload)
    }

    async fn transition(state: &Arc<RwLock<ConnectionState>>, event: BrokerEvent) {
        let mut current = state.write().await;
        let next = current.apply(event);
        if next != *current {
            info!(
                "MQTT connection state: {} -> {}",
                current.as_str(),
                next.as_str()
            );
            *current = next;
        }
    }

    // Drives the rumqttc event loop forever. Connection errors degrade the
    // gateway to "unavailable" and schedule a retry after a fixed interval;
    // they never terminate the process.
    async fn run_event_loop(
        mut event_loop: EventLoop,
        state: Arc<RwLock<ConnectionState>>,
        reconnect_count: Arc<RwLock<u32>>,
        reconnect_interval: Duration,
    ) {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("MQTT connection established");
                    Self::transition(&state, BrokerEvent::ConnAck).await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!("MQTT broker sent disconnect");
                    Self::transition(&state, BrokerEvent::Disconnect).await;
                }
                Ok(Event::Incoming(packet)) => {
                    debug!("Received MQTT packet: {:?}", packet);
                }
                Ok(Event::Outgoing(outgoing)) => {
                    debug!("Sending MQTT packet: {:?}", outgoing);
                }
                Err(e) => {
                    error!("MQTT connection error: {}", e);
                    Self::transition(&state, BrokerEvent::ConnectionError).await;

                    *reconnect_count.write().await += 1;
                    warn!(
                        "Retrying MQTT connection in {}ms",
                        reconnect_interval.as_millis()
                    );
                    tokio::time::sleep(reconnect_interval).await;
                    Self::transition(&state, BrokerEvent::Reconnecting).await;
                }
            }
        }
    }
}
