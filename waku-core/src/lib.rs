pub mod autosharding;
pub mod common;
pub mod content_topic;
pub mod message;
pub mod pubsub_topic;
