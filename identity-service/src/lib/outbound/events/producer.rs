use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;

use crate::config::Config;
use crate::domain::user::events::UserLoggedInEvent;
use crate::domain::user::events::UserRegisteredEvent;
use crate::outbound::events::messages::IdentityEventMessage;
use crate::user::errors::PublishError;
use crate::user::ports::EventPublisher;

/// Kafka adapter for the event publisher port.
///
/// One topic per event type. Sends carry a bounded timeout so a broker
/// outage surfaces to the orchestrator in bounded time, where it is
/// downgraded to a warning.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    registration_topic: String,
    login_topic: String,
    timeout: Duration,
}

impl KafkaEventPublisher {
    /// Create a new Kafka event publisher.
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate messages during retries
    /// - `retry.backoff.ms=100`: Backoff between retry attempts
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.kafka.brokers,
            registration_topic = %config.kafka.registration_topic,
            login_topic = %config.kafka.login_topic,
            "Initializing Kafka producer for identity events"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("message.timeout.ms", "10000")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "3")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            registration_topic: config.kafka.registration_topic.clone(),
            login_topic: config.kafka.login_topic.clone(),
            timeout: Duration::from_secs(10),
        })
    }

    async fn publish(
        &self,
        topic: &str,
        message: &IdentityEventMessage,
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_string(message)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;

        tracing::debug!(
            topic = topic,
            user_id = %message.user_id,
            event_type = %message.event_type,
            "Publishing identity event"
        );

        // Keyed by user id: events for the same user land on one partition.
        let record = FutureRecord::to(topic)
            .key(&message.user_id)
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| ())
            .map_err(|(err, _)| PublishError::PublishFailed(err.to_string()))
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish_user_registered(
        &self,
        event: &UserRegisteredEvent,
    ) -> Result<(), PublishError> {
        let message = IdentityEventMessage::from(event);
        self.publish(&self.registration_topic, &message).await
    }

    async fn publish_user_logged_in(
        &self,
        event: &UserLoggedInEvent,
    ) -> Result<(), PublishError> {
        let message = IdentityEventMessage::from(event);
        self.publish(&self.login_topic, &message).await
    }
}
