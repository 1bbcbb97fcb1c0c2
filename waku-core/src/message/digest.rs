use sha2::{Digest, Sha256};

use crate::message::WakuMessage;

/// Compute the Waku v2 message [deterministic hash](https://rfc.vac.dev/spec/14/#deterministic-message-hashing).
///
/// ```text
/// message_hash = sha256(concat(pubsub_topic, message.payload, message.content_topic, message.meta))
/// ```
pub fn compute_deterministic_message_hash(pubsub_topic: &str, message: &WakuMessage) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(pubsub_topic);
    hasher.update(&message.payload);
    hasher.update(message.content_topic.as_str());
    if let Some(meta) = &message.meta {
        hasher.update(meta);
    }
    hasher.finalize().into()
}

/// Compute the digest used by store nodes to index a message.
///
/// ```text
/// digest = sha256(concat(message.content_topic, message.payload))
/// ```
pub fn compute_message_digest(message: &WakuMessage) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(message.content_topic.as_str());
    hasher.update(&message.payload);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use hex_literal::hex;

    use super::*;

    const PUBSUB_TOPIC: &str = "/waku/2/default-waku/proto";

    fn message(meta: Option<Bytes>) -> WakuMessage {
        WakuMessage {
            payload: Bytes::from_static(&hex!("010203045445535405060708")),
            content_topic: "/waku/2/default-content/proto".into(),
            meta,
            ..Default::default()
        }
    }

    /// https://rfc.vac.dev/spec/14/#test-vectors (Test vector 1)
    #[test]
    fn test_deterministic_hash_with_meta() {
        // Given
        let message = message(Some(Bytes::from_static(&hex!("73757065722d736563726574"))));

        // When
        let hash = compute_deterministic_message_hash(PUBSUB_TOPIC, &message);

        // Then
        assert_eq!(
            hash,
            hex!("4fdde1099c9f77f6dae8147b6b3179aba1fc8e14a7bf35203fc253ee479f135f")
        );
    }

    /// https://rfc.vac.dev/spec/14/#test-vectors (Test vector 3)
    #[test]
    fn test_deterministic_hash_without_meta() {
        // Given
        let message = message(None);

        // When
        let hash = compute_deterministic_message_hash(PUBSUB_TOPIC, &message);

        // Then
        assert_eq!(
            hash,
            hex!("87619d05e563521d9126749b45bd4cc2430df0607e77e23572d874ed9c1aaa62")
        );
    }

    #[test]
    fn test_message_digest_ignores_metadata_and_timestamp() {
        // Given
        let message_a = WakuMessage {
            payload: Bytes::from_static(b"hello"),
            content_topic: "/test/1/store/proto".into(),
            timestamp: Some(1),
            ..Default::default()
        };
        let message_b = WakuMessage {
            timestamp: Some(2),
            meta: Some(Bytes::from_static(b"meta")),
            ..message_a.clone()
        };

        // When
        let digest_a = compute_message_digest(&message_a);
        let digest_b = compute_message_digest(&message_b);

        // Then
        assert_eq!(digest_a, digest_b);
        assert_eq!(
            digest_a,
            hex!("2834b3887edd09df272f18d25f33a1f84fb0db5d3ee8680dd40db95ad4a233e8")
        );
    }
}
