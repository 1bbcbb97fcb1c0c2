use crate::message::proto::waku::message::v1::WakuMessage as WakuMessageProto;
use crate::message::WakuMessage;

impl From<WakuMessageProto> for WakuMessage {
    fn from(proto: WakuMessageProto) -> Self {
        Self {
            payload: proto.payload,
            content_topic: proto.content_topic.into(),
            version: proto.version.unwrap_or_default(),
            timestamp: proto.timestamp,
            meta: proto.meta,
            ephemeral: proto.ephemeral.unwrap_or(false),
        }
    }
}

impl From<WakuMessage> for WakuMessageProto {
    fn from(message: WakuMessage) -> Self {
        WakuMessageProto {
            payload: message.payload,
            content_topic: message.content_topic.to_string(),
            version: (message.version > 0).then_some(message.version),
            timestamp: message.timestamp,
            meta: message.meta,
            rate_limit_proof: None,
            ephemeral: message.ephemeral.then_some(true),
        }
    }
}
