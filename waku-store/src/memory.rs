use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::envelope::Envelope;
use crate::pagination::{clamp_page_size, Direction, PageCursor};
use crate::protocol::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::provider::{MessageProvider, ProviderError, StoredMessage};
use crate::request::HistoryQuery;
use crate::timesource::{Timesource, WallClockTimesource};

const MILLISECOND_NANOS: i64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryProviderConfig {
    /// How far ahead of the local clock a message timestamp may be.
    pub max_time_variance_ms: u64,
    /// Keep at most this many messages. Zero disables the limit.
    pub max_messages: usize,
    /// Drop messages older than this. Zero disables the limit.
    pub max_duration_ms: u64,
}

impl Default for MemoryProviderConfig {
    fn default() -> Self {
        Self {
            max_time_variance_ms: 20_000,
            max_messages: 0,
            max_duration_ms: 0,
        }
    }
}

type MessageKey = (i64, Bytes);

#[derive(Default)]
struct State {
    messages: BTreeMap<MessageKey, StoredMessage>,
    digests: HashSet<Bytes>,
}

impl State {
    fn remove(&mut self, key: &MessageKey) {
        if self.messages.remove(key).is_some() {
            self.digests.remove(&key.1);
        }
    }

    fn enforce_retention(&mut self, config: &MemoryProviderConfig, now: i64) {
        if config.max_duration_ms > 0 {
            let oldest_allowed = now.saturating_sub(ms_to_nanos(config.max_duration_ms));
            let expired: Vec<MessageKey> = self
                .messages
                .range(..(oldest_allowed, Bytes::new()))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &expired {
                self.remove(key);
            }
        }

        if config.max_messages > 0 {
            while self.messages.len() > config.max_messages {
                let Some(key) = self.messages.keys().next().cloned() else {
                    break;
                };
                self.remove(&key);
            }
        }
    }
}

/// An in-memory message provider, ordered by `(stored_at, digest)`.
pub struct MemoryMessageProvider {
    config: MemoryProviderConfig,
    timesource: Arc<dyn Timesource>,
    state: RwLock<State>,
}

impl Default for MemoryMessageProvider {
    fn default() -> Self {
        Self::new(MemoryProviderConfig::default())
    }
}

impl MemoryMessageProvider {
    pub fn new(config: MemoryProviderConfig) -> Self {
        Self::with_timesource(config, Arc::new(WallClockTimesource))
    }

    pub fn with_timesource(config: MemoryProviderConfig, timesource: Arc<dyn Timesource>) -> Self {
        Self {
            config,
            timesource,
            state: RwLock::new(State::default()),
        }
    }

    pub fn config(&self) -> &MemoryProviderConfig {
        &self.config
    }
}

fn ms_to_nanos(ms: u64) -> i64 {
    i64::try_from(ms)
        .unwrap_or(i64::MAX)
        .saturating_mul(MILLISECOND_NANOS)
}

fn stored_at(envelope: &Envelope) -> i64 {
    match envelope.message().timestamp {
        Some(ts) if ts != 0 => ts,
        _ => envelope.receiver_time(),
    }
}

fn is_match(query: &HistoryQuery, stored: &StoredMessage) -> bool {
    if let Some(topic) = &query.pubsub_topic {
        if &stored.pubsub_topic != topic {
            return false;
        }
    }

    if !query.content_topics.is_empty()
        && !query
            .content_topics
            .contains(&stored.message.content_topic)
    {
        return false;
    }

    if matches!(query.start_time, Some(start) if stored.stored_at < start) {
        return false;
    }

    if matches!(query.end_time, Some(end) if stored.stored_at > end) {
        return false;
    }

    true
}

#[async_trait]
impl MessageProvider for MemoryMessageProvider {
    async fn query(
        &self,
        query: &HistoryQuery,
    ) -> Result<(Option<PageCursor>, Vec<StoredMessage>), ProviderError> {
        let paging = query.paging();
        let page_size = clamp_page_size(paging.page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE) as usize;

        let state = self.state.read().await;

        let cursor_key = match &paging.cursor {
            Some(cursor) => {
                let key = (cursor.receiver_time, cursor.digest.clone());
                if !state.messages.contains_key(&key) {
                    return Err(ProviderError::InvalidCursor);
                }
                Some(key)
            }
            None => None,
        };

        let lower = cursor_key
            .clone()
            .map_or(Bound::Unbounded, Bound::Excluded);
        let upper = cursor_key.map_or(Bound::Unbounded, Bound::Excluded);

        // One extra candidate tells whether another page follows.
        let mut page: Vec<StoredMessage> = match paging.direction {
            Direction::Forward => state
                .messages
                .range((lower, Bound::Unbounded))
                .map(|(_, stored)| stored)
                .filter(|stored| is_match(query, stored))
                .take(page_size + 1)
                .cloned()
                .collect(),
            Direction::Backward => state
                .messages
                .range((Bound::Unbounded, upper))
                .rev()
                .map(|(_, stored)| stored)
                .filter(|stored| is_match(query, stored))
                .take(page_size + 1)
                .cloned()
                .collect(),
        };

        let mut next_cursor = None;
        if page.len() > page_size {
            page.truncate(page_size);
            next_cursor = page.last().map(StoredMessage::cursor);
        }

        if paging.direction == Direction::Backward {
            page.reverse();
        }

        Ok((next_cursor, page))
    }

    async fn put(&self, envelope: &Envelope) -> Result<(), ProviderError> {
        let mut state = self.state.write().await;

        let digest = envelope.digest().clone();
        if state.digests.contains(&digest) {
            return Err(ProviderError::DuplicateMessage);
        }

        let stored = StoredMessage {
            id: digest.clone(),
            pubsub_topic: envelope.pubsub_topic().clone(),
            stored_at: stored_at(envelope),
            message: envelope.message().clone(),
        };

        state.digests.insert(digest.clone());
        state.messages.insert((stored.stored_at, digest), stored);
        state.enforce_retention(&self.config, self.timesource.now());

        Ok(())
    }

    fn validate(&self, envelope: &Envelope) -> Result<(), ProviderError> {
        let message = envelope.message();
        if message.content_topic.is_empty() {
            return Err(ProviderError::InvalidMessage("missing content topic"));
        }

        let Some(timestamp) = message.timestamp.filter(|ts| *ts != 0) else {
            return Ok(());
        };

        let now = self.timesource.now();
        if timestamp > now.saturating_add(ms_to_nanos(self.config.max_time_variance_ms)) {
            return Err(ProviderError::FutureMessage);
        }

        if self.config.max_duration_ms > 0
            && timestamp < now.saturating_sub(ms_to_nanos(self.config.max_duration_ms))
        {
            return Err(ProviderError::MessageTooOld);
        }

        Ok(())
    }

    async fn most_recent_timestamp(&self) -> Result<i64, ProviderError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .keys()
            .next_back()
            .map(|(stored_at, _)| *stored_at)
            .unwrap_or(0))
    }

    async fn count(&self) -> Result<usize, ProviderError> {
        Ok(self.state.read().await.messages.len())
    }

    async fn get_all(&self) -> Result<Vec<StoredMessage>, ProviderError> {
        Ok(self.state.read().await.messages.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use assert_matches::assert_matches;
    use waku_core::content_topic::ContentTopic;
    use waku_core::message::WakuMessage;
    use waku_core::pubsub_topic::PubsubTopic;

    use crate::pagination::PagingInfo;

    use super::*;

    const SECOND: i64 = 1_000_000_000;

    struct ManualTimesource(AtomicI64);

    impl Timesource for ManualTimesource {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn provider_at(now: i64, config: MemoryProviderConfig) -> MemoryMessageProvider {
        MemoryMessageProvider::with_timesource(config, Arc::new(ManualTimesource(AtomicI64::new(now))))
    }

    fn envelope(payload: &str, content_topic: &str, timestamp: i64) -> Envelope {
        let message = WakuMessage {
            payload: Bytes::copy_from_slice(payload.as_bytes()),
            content_topic: ContentTopic::new(content_topic),
            timestamp: Some(timestamp),
            ..Default::default()
        };
        Envelope::new(message, timestamp, PubsubTopic::default())
    }

    fn payloads(messages: &[StoredMessage]) -> Vec<String> {
        messages
            .iter()
            .map(|m| String::from_utf8_lossy(&m.message.payload).into_owned())
            .collect()
    }

    fn paged(page_size: u64, cursor: Option<PageCursor>, direction: Direction) -> HistoryQuery {
        HistoryQuery {
            paging_info: Some(PagingInfo {
                page_size,
                cursor,
                direction,
            }),
            ..Default::default()
        }
    }

    async fn seeded(count: i64) -> MemoryMessageProvider {
        let provider = provider_at(100 * SECOND, MemoryProviderConfig::default());
        for i in 1..=count {
            provider
                .put(&envelope(&format!("m{i}"), "/app/1/chat/proto", i * SECOND))
                .await
                .unwrap();
        }
        provider
    }

    #[tokio::test]
    async fn test_forward_pages() {
        // Given
        let provider = seeded(5).await;

        // When
        let (cursor1, page1) = provider.query(&paged(2, None, Direction::Forward)).await.unwrap();
        let (cursor2, page2) = provider
            .query(&paged(2, cursor1.clone(), Direction::Forward))
            .await
            .unwrap();
        let (cursor3, page3) = provider
            .query(&paged(2, cursor2.clone(), Direction::Forward))
            .await
            .unwrap();

        // Then
        assert_eq!(payloads(&page1), vec!["m1", "m2"]);
        assert_eq!(payloads(&page2), vec!["m3", "m4"]);
        assert_eq!(payloads(&page3), vec!["m5"]);
        assert!(cursor1.is_some());
        assert!(cursor2.is_some());
        assert!(cursor3.is_none());
    }

    #[tokio::test]
    async fn test_backward_pages_are_chronological() {
        // Given
        let provider = seeded(5).await;

        // When
        let (cursor1, page1) = provider.query(&paged(2, None, Direction::Backward)).await.unwrap();
        let (_, page2) = provider
            .query(&paged(2, cursor1, Direction::Backward))
            .await
            .unwrap();

        // Then
        assert_eq!(payloads(&page1), vec!["m4", "m5"]);
        assert_eq!(payloads(&page2), vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn test_exact_page_has_no_cursor() {
        // Given
        let provider = seeded(2).await;

        // When
        let (cursor, page) = provider.query(&paged(2, None, Direction::Forward)).await.unwrap();

        // Then
        assert_eq!(page.len(), 2);
        assert!(cursor.is_none());
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_rejected() {
        // Given
        let provider = seeded(3).await;
        let cursor = PageCursor {
            digest: Bytes::from_static(b"unknown"),
            receiver_time: 2 * SECOND,
            sender_time: 2 * SECOND,
            pubsub_topic: PubsubTopic::default(),
        };

        // When
        let result = provider.query(&paged(2, Some(cursor), Direction::Forward)).await;

        // Then
        assert_matches!(result, Err(ProviderError::InvalidCursor));
    }

    #[tokio::test]
    async fn test_filters_and_time_window() {
        // Given
        let provider = provider_at(100 * SECOND, MemoryProviderConfig::default());
        provider.put(&envelope("a1", "/app/1/a/proto", SECOND)).await.unwrap();
        provider.put(&envelope("b2", "/app/1/b/proto", 2 * SECOND)).await.unwrap();
        provider.put(&envelope("a3", "/app/1/a/proto", 3 * SECOND)).await.unwrap();
        provider.put(&envelope("a4", "/app/1/a/proto", 4 * SECOND)).await.unwrap();

        let query = HistoryQuery {
            content_topics: vec![ContentTopic::new("/app/1/a/proto")],
            start_time: Some(SECOND),
            end_time: Some(3 * SECOND),
            ..Default::default()
        };

        // When
        let (cursor, page) = provider.query(&query).await.unwrap();

        // Then
        assert_eq!(payloads(&page), vec!["a1", "a3"]);
        assert!(cursor.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_put() {
        // Given
        let provider = provider_at(100 * SECOND, MemoryProviderConfig::default());
        let env = envelope("m1", "/app/1/chat/proto", SECOND);
        provider.put(&env).await.unwrap();

        // When
        let result = provider.put(&env).await;

        // Then
        assert_matches!(result, Err(ProviderError::DuplicateMessage));
        assert_eq!(provider.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stored_at_falls_back_to_receiver_time() {
        // Given
        let provider = provider_at(100 * SECOND, MemoryProviderConfig::default());
        let message = WakuMessage {
            payload: Bytes::from_static(b"no-ts"),
            content_topic: ContentTopic::new("/app/1/chat/proto"),
            ..Default::default()
        };
        provider
            .put(&Envelope::new(message, 7 * SECOND, PubsubTopic::default()))
            .await
            .unwrap();

        // When
        let latest = provider.most_recent_timestamp().await.unwrap();

        // Then
        assert_eq!(latest, 7 * SECOND);
    }

    #[tokio::test]
    async fn test_most_recent_timestamp_of_empty_store() {
        let provider = provider_at(100 * SECOND, MemoryProviderConfig::default());
        assert_eq!(provider.most_recent_timestamp().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_retention_by_count() {
        // Given
        let config = MemoryProviderConfig {
            max_messages: 2,
            ..Default::default()
        };
        let provider = provider_at(100 * SECOND, config);

        // When
        for i in 1..=3 {
            provider
                .put(&envelope(&format!("m{i}"), "/app/1/chat/proto", i * SECOND))
                .await
                .unwrap();
        }

        // Then
        let all = provider.get_all().await.unwrap();
        assert_eq!(payloads(&all), vec!["m2", "m3"]);
    }

    #[test]
    fn test_validate() {
        // Given
        let config = MemoryProviderConfig {
            max_duration_ms: 60_000,
            ..Default::default()
        };
        let provider = provider_at(100 * SECOND, config);

        // Then
        assert_matches!(provider.validate(&envelope("ok", "/app/1/chat/proto", 99 * SECOND)), Ok(()));
        assert_matches!(
            provider.validate(&envelope("future", "/app/1/chat/proto", 121 * SECOND)),
            Err(ProviderError::FutureMessage)
        );
        assert_matches!(
            provider.validate(&envelope("old", "/app/1/chat/proto", 30 * SECOND)),
            Err(ProviderError::MessageTooOld)
        );
        assert_matches!(
            provider.validate(&envelope("no-topic", "", 99 * SECOND)),
            Err(ProviderError::InvalidMessage(_))
        );
    }
}
