use bytes::Bytes;

use waku_core::message::{compute_deterministic_message_hash, compute_message_digest, WakuMessage};
use waku_core::pubsub_topic::PubsubTopic;

use crate::pagination::PageCursor;

/// A message as received from the pub/sub layer, together with its transport metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    message: WakuMessage,
    receiver_time: i64,
    pubsub_topic: PubsubTopic,
    hash: Bytes,
    index: PageCursor,
}

impl Envelope {
    pub fn new(message: WakuMessage, receiver_time: i64, pubsub_topic: PubsubTopic) -> Self {
        let hash = compute_deterministic_message_hash(pubsub_topic.as_str(), &message);
        let digest = compute_message_digest(&message);

        let index = PageCursor {
            digest: Bytes::copy_from_slice(&digest),
            receiver_time,
            sender_time: message.timestamp_or_zero(),
            pubsub_topic: pubsub_topic.clone(),
        };

        Self {
            message,
            receiver_time,
            pubsub_topic,
            hash: Bytes::copy_from_slice(&hash),
            index,
        }
    }

    pub fn message(&self) -> &WakuMessage {
        &self.message
    }

    /// Nanoseconds since the Unix epoch at which this node received the message.
    pub fn receiver_time(&self) -> i64 {
        self.receiver_time
    }

    pub fn pubsub_topic(&self) -> &PubsubTopic {
        &self.pubsub_topic
    }

    /// Deterministic message hash, unique per pubsub topic. Resume de-duplicates on it.
    pub fn hash(&self) -> &Bytes {
        &self.hash
    }

    /// The message digest the store de-duplicates on.
    pub fn digest(&self) -> &Bytes {
        &self.index.digest
    }
}
