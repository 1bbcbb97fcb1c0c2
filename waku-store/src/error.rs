use std::io;

use waku_core::content_topic::ContentTopicError;

use crate::peer_manager::PeerManagerError;
use crate::provider::ProviderError;
use crate::response::HistoryErrorKind;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid query: {0}")]
    Validation(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("no suitable remote peers")]
    NoPeersAvailable,

    #[error("peer and peer address cannot be selected at the same time")]
    PeerSelectionConflict,

    #[error("store protocol not started")]
    NotStarted,

    #[error("failed to resume the history")]
    ResumeFailed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out")]
    Timeout,

    #[error("unknown history response error: {0}")]
    UnknownResponseError(i32),

    #[error("message provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("peer manager error: {0}")]
    PeerManager(#[from] PeerManagerError),

    #[error("invalid content topic: {0}")]
    ContentTopic(#[from] ContentTopicError),
}

impl From<HistoryErrorKind> for StoreError {
    fn from(kind: HistoryErrorKind) -> Self {
        match kind {
            HistoryErrorKind::InvalidCursor => StoreError::InvalidCursor,
            HistoryErrorKind::Unknown(code) => StoreError::UnknownResponseError(code),
        }
    }
}
