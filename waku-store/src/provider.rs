use async_trait::async_trait;
use bytes::Bytes;

use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

use crate::envelope::Envelope;
use crate::pagination::PageCursor;
use crate::request::HistoryQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// The message digest.
    pub id: Bytes,
    pub pubsub_topic: PubsubTopic,
    /// The ordering timestamp: the sender timestamp when set, otherwise the receive time.
    pub stored_at: i64,
    pub message: WakuMessage,
}

impl StoredMessage {
    /// The cursor pointing at this message.
    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            digest: self.id.clone(),
            receiver_time: self.stored_at,
            sender_time: self.message.timestamp_or_zero(),
            pubsub_topic: self.pubsub_topic.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid cursor")]
    InvalidCursor,

    #[error("duplicate message")]
    DuplicateMessage,

    #[error("message timestamp too far in the future")]
    FutureMessage,

    #[error("message too old")]
    MessageTooOld,

    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),

    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

/// Persistent message state behind the store protocol. Implementations must tolerate concurrent
/// calls from the ingestion loop, the stream handlers and resume.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Return at most one page of messages matching the query, in chronological order, plus the
    /// cursor of the next page when more messages remain.
    async fn query(
        &self,
        query: &HistoryQuery,
    ) -> Result<(Option<PageCursor>, Vec<StoredMessage>), ProviderError>;

    async fn put(&self, envelope: &Envelope) -> Result<(), ProviderError>;

    fn validate(&self, envelope: &Envelope) -> Result<(), ProviderError>;

    /// Zero when the store is empty.
    async fn most_recent_timestamp(&self) -> Result<i64, ProviderError>;

    async fn count(&self) -> Result<usize, ProviderError>;

    async fn get_all(&self) -> Result<Vec<StoredMessage>, ProviderError>;
}
