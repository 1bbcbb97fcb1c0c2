use waku_core::pubsub_topic::PubsubTopic;

use crate::pagination::{Direction, PageCursor, PagingInfo};
use crate::rpc::paging_info::Direction as DirectionProto;
use crate::rpc::{Index, PagingInfo as PagingInfoProto};

impl From<Index> for PageCursor {
    fn from(cursor: Index) -> Self {
        PageCursor {
            digest: cursor.digest,
            receiver_time: cursor.receiver_time,
            sender_time: cursor.sender_time,
            pubsub_topic: PubsubTopic::new(cursor.pubsub_topic),
        }
    }
}

impl From<PageCursor> for Index {
    fn from(cursor: PageCursor) -> Self {
        Index {
            digest: cursor.digest,
            receiver_time: cursor.receiver_time,
            sender_time: cursor.sender_time,
            pubsub_topic: cursor.pubsub_topic.into_string(),
        }
    }
}

impl From<i32> for Direction {
    fn from(direction: i32) -> Self {
        if direction == DirectionProto::Forward as i32 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => DirectionProto::Forward as i32,
            Direction::Backward => DirectionProto::Backward as i32,
        }
    }
}

impl From<PagingInfoProto> for PagingInfo {
    fn from(info: PagingInfoProto) -> Self {
        PagingInfo {
            page_size: info.page_size,
            cursor: info.cursor.map(Into::into),
            direction: info.direction.into(),
        }
    }
}

impl From<PagingInfo> for PagingInfoProto {
    fn from(info: PagingInfo) -> Self {
        PagingInfoProto {
            page_size: info.page_size,
            cursor: info.cursor.map(Into::into),
            direction: info.direction.into(),
        }
    }
}
