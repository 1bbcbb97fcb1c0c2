//! Content topic to pubsub topic mapping for generation zero autosharding.
use sha2::{Digest, Sha256};

use crate::content_topic::{ContentTopic, ContentTopicError, NsContentTopic};
use crate::pubsub_topic::{NsPubsubTopic, PubsubTopic};

pub const CLUSTER_INDEX: u16 = 1;

pub const GENERATION_ZERO_SHARDS_COUNT: u64 = 8;

/// Compute the static sharding topic a content topic is assigned to.
///
/// ```text
/// shard = be_u64(sha256(concat(application, version))[24..32]) % shard_count
/// ```
pub fn shard_from_content_topic(topic: &NsContentTopic, shard_count: u64) -> NsPubsubTopic {
    let mut hasher = Sha256::new();
    hasher.update(topic.application.as_bytes());
    hasher.update(topic.version.as_bytes());
    let hash = hasher.finalize();

    // Only the last 64 bits are used, a larger shard count is not expected.
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&hash[24..32]);
    let shard = u64::from_be_bytes(tail) % shard_count;

    NsPubsubTopic::new_static_sharding(CLUSTER_INDEX, shard as u16)
}

/// Resolve the pubsub topic a content topic is published under.
pub fn pubsub_topic_from_content_topic(
    topic: &ContentTopic,
) -> Result<PubsubTopic, ContentTopicError> {
    let ns_topic = topic.parse_ns()?;
    Ok(shard_from_content_topic(&ns_topic, GENERATION_ZERO_SHARDS_COUNT).into())
}
