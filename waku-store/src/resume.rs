use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use libp2p::PeerId;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

use crate::envelope::Envelope;
use crate::error::StoreError;
use crate::pagination::{Direction, PagingInfo};
use crate::request::{HistoryQuery, HistoryRequest};
use crate::store::WakuStore;

/// What one peer contributed to a resume. `messages` holds every page read before `error`, if
/// the peer failed partway.
struct ResumePeerOutcome {
    peer_id: PeerId,
    pages: usize,
    messages: Vec<WakuMessage>,
    error: Option<StoreError>,
}

impl WakuStore {
    /// Retrieve the history published on `pubsub_topic` since the most recent locally stored
    /// message, from every peer in `peers` at once, and persist it.
    ///
    /// Returns the number of messages newly stored. Fails only when no peer could be queried.
    pub async fn resume(
        &self,
        ctx: &CancellationToken,
        pubsub_topic: &PubsubTopic,
        peers: &[PeerId],
    ) -> Result<usize, StoreError> {
        if !self.is_started() {
            return Err(StoreError::NotStarted);
        }

        if peers.is_empty() {
            return Err(StoreError::NoPeersAvailable);
        }

        let provider = self.message_provider().ok_or(StoreError::NotStarted)?;
        let last_seen = provider.most_recent_timestamp().await?;

        let offset = i64::try_from(self.config().resume_guard_offset().as_nanos())
            .unwrap_or(i64::MAX);
        let now = self.timesource().now();

        let query = HistoryQuery {
            pubsub_topic: Some(pubsub_topic.clone()),
            content_topics: Vec::new(),
            start_time: Some(last_seen.saturating_sub(offset).max(0)),
            end_time: Some(now.saturating_add(offset)),
            paging_info: Some(PagingInfo {
                page_size: 0,
                cursor: None,
                direction: Direction::Backward,
            }),
        };

        let outcomes = self.query_loop(ctx, &query, peers).await;
        if ctx.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let mut responded = 0;
        let mut messages = Vec::new();
        for outcome in outcomes {
            let ResumePeerOutcome {
                peer_id,
                pages,
                messages: peer_messages,
                error,
            } = outcome;

            if let Some(err) = error {
                warn!("resume: could not query peer {peer_id} after {pages} pages: {err}");
            }

            if pages > 0 {
                debug!("resume: {} messages from {peer_id}", peer_messages.len());
                responded += 1;
                messages.extend(peer_messages);
            }
        }

        if responded == 0 {
            return Err(StoreError::ResumeFailed);
        }

        let mut seen = HashSet::new();
        let mut stored = 0;
        for message in messages {
            let envelope = Envelope::new(message, self.timesource().now(), pubsub_topic.clone());
            if !seen.insert(envelope.hash().clone()) {
                continue;
            }

            match self.store_message(&envelope).await {
                Ok(true) => stored += 1,
                Ok(false) => {}
                Err(err) => debug!("resume: could not store message: {err}"),
            }
        }

        info!("retrieved {stored} messages since the last online time from {responded} peers");

        Ok(stored)
    }

    /// Send the same query to every peer, with at most `resume_concurrency` in flight. Each
    /// peer keeps its own outcome slot, in input order.
    async fn query_loop(
        &self,
        ctx: &CancellationToken,
        query: &HistoryQuery,
        peers: &[PeerId],
    ) -> Vec<ResumePeerOutcome> {
        let limit = self
            .config()
            .resume_concurrency
            .unwrap_or(peers.len())
            .max(1);

        stream::iter(peers.iter().copied())
            .map(|peer_id| self.drain_peer(ctx, query.clone(), peer_id))
            .buffered(limit)
            .collect()
            .await
    }

    /// Follow the cursors on `peer_id` until its last page, a repeated cursor, or
    /// `resume_max_pages` pages. A failed page ends the walk but keeps the pages read before it.
    async fn drain_peer(
        &self,
        ctx: &CancellationToken,
        mut query: HistoryQuery,
        peer_id: PeerId,
    ) -> ResumePeerOutcome {
        let max_pages = self.config().resume_max_pages.max(1);
        let mut outcome = ResumePeerOutcome {
            peer_id,
            pages: 0,
            messages: Vec::new(),
            error: None,
        };

        while outcome.pages < max_pages {
            let request = HistoryRequest {
                request_id: hex::encode(Uuid::new_v4().as_bytes()),
                query: query.clone(),
            };

            let body = match self.query_from(ctx, request, peer_id).await {
                Ok(body) => body,
                Err(err) => {
                    outcome.error = Some(err);
                    return outcome;
                }
            };
            outcome.pages += 1;
            outcome.messages.extend(body.messages);

            let paging = query.paging();
            match body.next_page {
                Some(cursor) if paging.cursor.as_ref() == Some(&cursor) => {
                    warn!("resume: {peer_id} repeated its cursor. stopping");
                    return outcome;
                }
                Some(cursor) => {
                    query.paging_info = Some(PagingInfo {
                        cursor: Some(cursor),
                        ..paging
                    });
                }
                None => return outcome,
            }
        }

        warn!("resume: stopped reading from {peer_id} after {max_pages} pages");
        outcome
    }
}
