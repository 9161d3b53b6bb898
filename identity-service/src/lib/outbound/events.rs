pub mod messages;
pub mod producer;

pub use producer::KafkaEventPublisher;
