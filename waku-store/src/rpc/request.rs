use waku_core::content_topic::ContentTopic;
use waku_core::pubsub_topic::PubsubTopic;

use crate::request::{HistoryQuery, HistoryRequest};
use crate::rpc::{ContentFilter, HistoryQuery as HistoryQueryProto, HistoryRpc};
use crate::validation::ValidationError;

impl From<HistoryQueryProto> for HistoryQuery {
    fn from(query: HistoryQueryProto) -> Self {
        HistoryQuery {
            pubsub_topic: query.pubsub_topic.map(PubsubTopic::new),
            content_topics: query
                .content_filters
                .into_iter()
                .map(|filter| ContentTopic::new(filter.content_topic))
                .collect(),
            start_time: query.start_time,
            end_time: query.end_time,
            paging_info: query.paging_info.map(Into::into),
        }
    }
}

impl From<HistoryQuery> for HistoryQueryProto {
    fn from(query: HistoryQuery) -> Self {
        HistoryQueryProto {
            pubsub_topic: query.pubsub_topic.map(PubsubTopic::into_string),
            content_filters: query
                .content_topics
                .into_iter()
                .map(|topic| ContentFilter {
                    content_topic: topic.to_string(),
                })
                .collect(),
            paging_info: query.paging_info.map(Into::into),
            start_time: query.start_time,
            end_time: query.end_time,
        }
    }
}

impl TryFrom<HistoryRpc> for HistoryRequest {
    type Error = ValidationError;

    fn try_from(rpc: HistoryRpc) -> Result<Self, Self::Error> {
        let query = rpc.query.ok_or(ValidationError::MissingQuery)?;

        Ok(HistoryRequest {
            request_id: rpc.request_id,
            query: query.into(),
        })
    }
}

impl From<HistoryRequest> for HistoryRpc {
    fn from(request: HistoryRequest) -> Self {
        HistoryRpc {
            request_id: request.request_id,
            query: Some(request.query.into()),
            response: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bytes::Bytes;

    use crate::pagination::{Direction, PageCursor, PagingInfo};

    use super::*;

    #[test]
    fn test_request_into_rpc_keeps_time_window() {
        // Given
        let request = HistoryRequest {
            request_id: "01".to_string(),
            query: HistoryQuery {
                pubsub_topic: Some(PubsubTopic::new("/waku/2/rs/1/3")),
                content_topics: vec![ContentTopic::new("/toychat/2/huilong/proto")],
                start_time: Some(10),
                end_time: Some(20),
                paging_info: Some(PagingInfo {
                    page_size: 5,
                    cursor: None,
                    direction: Direction::Backward,
                }),
            },
        };

        // When
        let rpc = HistoryRpc::from(request.clone());
        let decoded = HistoryRequest::try_from(rpc.clone()).unwrap();

        // Then
        let query = rpc.query.unwrap();
        assert_eq!(query.start_time, Some(10));
        assert_eq!(query.end_time, Some(20));
        assert_eq!(query.paging_info.unwrap().direction, 0);
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_cursor_fields_survive_conversion() {
        // Given
        let cursor = PageCursor {
            digest: Bytes::from_static(b"digest"),
            receiver_time: 100,
            sender_time: 90,
            pubsub_topic: PubsubTopic::new("/waku/2/default-waku/proto"),
        };
        let query = HistoryQuery {
            paging_info: Some(PagingInfo {
                page_size: 1,
                cursor: Some(cursor.clone()),
                direction: Direction::Forward,
            }),
            ..Default::default()
        };

        // When
        let proto = HistoryQueryProto::from(query);

        // Then
        let index = proto.paging_info.clone().unwrap().cursor.unwrap();
        assert_eq!(index.receiver_time, 100);
        assert_eq!(index.sender_time, 90);
        assert_eq!(HistoryQuery::from(proto).paging().cursor, Some(cursor));
    }

    #[test]
    fn test_rpc_without_query_is_rejected() {
        // Given
        let rpc = HistoryRpc {
            request_id: "01".to_string(),
            query: None,
            response: None,
        };

        // When
        let result = HistoryRequest::try_from(rpc);

        // Then
        assert_matches!(result, Err(ValidationError::MissingQuery));
    }
}
