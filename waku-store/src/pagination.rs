use bytes::Bytes;

use waku_core::pubsub_topic::PubsubTopic;

/// Server-issued position marker identifying the last message of a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor {
    pub digest: Bytes,
    pub receiver_time: i64,
    pub sender_time: i64,
    pub pubsub_topic: PubsubTopic,
}

/// Chronological order of the returned messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Backward,
    #[default]
    Forward,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagingInfo {
    /// Zero means "use the default page size".
    pub page_size: u64,
    pub cursor: Option<PageCursor>,
    pub direction: Direction,
}

/// Replace a zero page size with `default` and cap it at `max`.
pub fn clamp_page_size(page_size: u64, default: u64, max: u64) -> u64 {
    if page_size == 0 {
        default.min(max)
    } else {
        page_size.min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(0, 20, 100), 20);
        assert_eq!(clamp_page_size(1, 20, 100), 1);
        assert_eq!(clamp_page_size(100, 20, 100), 100);
        assert_eq!(clamp_page_size(101, 20, 100), 100);
        assert_eq!(clamp_page_size(0, 200, 100), 100);
    }
}
