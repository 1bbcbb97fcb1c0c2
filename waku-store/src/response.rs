use waku_core::message::WakuMessage;

use crate::pagination::PageCursor;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryResponseBody {
    pub messages: Vec<WakuMessage>,
    /// Cursor for the next page. `None` signals the result set is exhausted.
    pub next_page: Option<PageCursor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HistoryErrorKind {
    #[error("invalid pagination cursor")]
    InvalidCursor,

    #[error("unknown error: {0}")]
    Unknown(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryResponse {
    pub request_id: String,
    pub result: Result<HistoryResponseBody, HistoryErrorKind>,
}
