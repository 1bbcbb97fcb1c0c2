use std::fmt::{Debug, Formatter};

use bytes::Bytes;

use crate::content_topic::ContentTopic;

#[derive(Clone, Default, Eq, PartialEq)]
pub struct WakuMessage {
    pub payload: Bytes,
    pub content_topic: ContentTopic,
    pub version: u32,
    /// Sender timestamp, in nanoseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    pub meta: Option<Bytes>,
    pub ephemeral: bool,
}

impl WakuMessage {
    /// The sender timestamp, or zero when the sender did not set one.
    pub fn timestamp_or_zero(&self) -> i64 {
        self.timestamp.unwrap_or(0)
    }
}

impl Debug for WakuMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let payload_fmt = match self.payload.get(0..32) {
            Some(slice) => format!("{}…", hex::encode(slice)),
            None => hex::encode(&self.payload[..]),
        };
        let meta_fmt = self.meta.as_ref().map_or("None".to_string(), hex::encode);

        f.debug_struct("WakuMessage")
            .field("content_topic", &self.content_topic)
            .field("timestamp", &self.timestamp)
            .field("version", &self.version)
            .field("meta", &meta_fmt)
            .field("payload", &payload_fmt)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}
