use waku_core::content_topic::ContentTopic;
use waku_core::pubsub_topic::PubsubTopic;

use crate::pagination::PagingInfo;

/// The criteria a caller searches the message history with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreQuery {
    /// When absent, the pubsub topics are derived from the content topics.
    pub pubsub_topic: Option<PubsubTopic>,
    pub content_topics: Vec<ContentTopic>,
    /// Nanoseconds since the Unix epoch.
    pub start_time: Option<i64>,
    /// Nanoseconds since the Unix epoch.
    pub end_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryQuery {
    pub pubsub_topic: Option<PubsubTopic>,
    pub content_topics: Vec<ContentTopic>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub paging_info: Option<PagingInfo>,
}

impl HistoryQuery {
    /// The paging parameters, or the defaults when the requester sent none.
    pub fn paging(&self) -> PagingInfo {
        self.paging_info.clone().unwrap_or_default()
    }
}

impl From<StoreQuery> for HistoryQuery {
    fn from(query: StoreQuery) -> Self {
        Self {
            pubsub_topic: query.pubsub_topic,
            content_topics: query.content_topics,
            start_time: query.start_time,
            end_time: query.end_time,
            paging_info: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub request_id: String,
    pub query: HistoryQuery,
}
