use std::fmt;

use libp2p::PeerId;
use log::{debug, error};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use waku_core::autosharding::pubsub_topic_from_content_topic;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;

use crate::error::StoreError;
use crate::options::{PeerTarget, QueryOptions};
use crate::pagination::{PageCursor, PagingInfo};
use crate::peer_manager::{PeerManagerError, PeerOrigin, PeerSelection, PeerSelectionCriteria};
use crate::protocol::PROTOCOL_ID;
use crate::request::{HistoryQuery, HistoryRequest, StoreQuery};
use crate::response::HistoryResponseBody;
use crate::store::WakuStore;
use crate::validation::{
    validate_outbound_query, validate_query, validate_request, validate_response,
};

/// One page of a history query, pinned to the peer that answered it.
pub struct HistoryResult {
    store: WakuStore,
    started: bool,
    messages: Vec<WakuMessage>,
    query: HistoryQuery,
    cursor: Option<PageCursor>,
    /// `None` for results served by the local message provider.
    peer_id: Option<PeerId>,
}

impl HistoryResult {
    fn new(
        store: WakuStore,
        query: HistoryQuery,
        peer_id: Option<PeerId>,
        body: HistoryResponseBody,
    ) -> Self {
        Self {
            store,
            started: false,
            messages: body.messages,
            query,
            cursor: body.next_page,
            peer_id,
        }
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    /// True once the peer signalled there are no further pages.
    pub fn is_complete(&self) -> bool {
        self.cursor.is_none()
    }

    pub fn peer_id(&self) -> Option<PeerId> {
        self.peer_id
    }

    pub fn query(&self) -> &HistoryQuery {
        &self.query
    }

    pub fn messages(&self) -> &[WakuMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<WakuMessage> {
        self.messages
    }

    /// Advance to the next page.
    ///
    /// The first call only reports whether the page fetched by the query holds any message.
    /// Later calls fetch the following page from the same peer, and return `false` once the
    /// result is complete. On error the current page is kept.
    pub async fn next(&mut self, ctx: &CancellationToken) -> Result<bool, StoreError> {
        if !self.started {
            self.started = true;
            return Ok(!self.messages.is_empty());
        }

        if self.is_complete() {
            return Ok(false);
        }

        let next = self.store.next(ctx, self).await?;
        self.messages = next.messages;
        self.cursor = next.cursor;

        Ok(true)
    }
}

impl fmt::Debug for HistoryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryResult")
            .field("started", &self.started)
            .field("messages", &self.messages)
            .field("query", &self.query)
            .field("cursor", &self.cursor)
            .field("peer_id", &self.peer_id)
            .finish()
    }
}

fn new_request_id(options: &QueryOptions) -> String {
    match &options.request_id {
        Some(id) => hex::encode(id),
        None => hex::encode(Uuid::new_v4().as_bytes()),
    }
}

impl WakuStore {
    /// Query the message history of a store node, or of the local message provider when
    /// `options.local_query` is set.
    pub async fn query(
        &self,
        ctx: &CancellationToken,
        query: StoreQuery,
        options: QueryOptions,
    ) -> Result<HistoryResult, StoreError> {
        let mut history_query = HistoryQuery::from(query);
        history_query.paging_info = Some(PagingInfo {
            page_size: self.config().clamp_page_size(options.page_size),
            cursor: options.cursor.clone(),
            direction: options.direction,
        });

        if options.local_query {
            validate_query(&history_query)?;
            if !self.is_started() {
                return Err(StoreError::NotStarted);
            }

            let body = self.find_messages(history_query.clone()).await?;
            return Ok(HistoryResult::new(self.clone(), history_query, None, body));
        }

        let request = HistoryRequest {
            request_id: new_request_id(&options),
            query: history_query,
        };
        validate_outbound_query(&request.query)?;
        validate_request(&request)?;

        let pubsub_topics = self.resolve_pubsub_topics(&request.query)?;

        let peer_id = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(StoreError::Cancelled),
            peer_id = self.resolve_peer(&options.peer, &pubsub_topics) => peer_id?,
        };

        let query = request.query.clone();
        let body = self.query_from(ctx, request, peer_id).await?;

        Ok(HistoryResult::new(self.clone(), query, Some(peer_id), body))
    }

    /// Fetch the page following `result` from the same peer. A complete result yields an empty,
    /// complete result.
    pub async fn next(
        &self,
        ctx: &CancellationToken,
        result: &HistoryResult,
    ) -> Result<HistoryResult, StoreError> {
        if result.is_complete() {
            return Ok(HistoryResult {
                store: self.clone(),
                started: true,
                messages: Vec::new(),
                query: result.query.clone(),
                cursor: None,
                peer_id: result.peer_id,
            });
        }

        let mut query = result.query.clone();
        query.paging_info = Some(PagingInfo {
            cursor: result.cursor.clone(),
            ..query.paging()
        });

        let body = match result.peer_id {
            None => self.find_messages(query).await?,
            Some(peer_id) => {
                let request = HistoryRequest {
                    request_id: new_request_id(&QueryOptions::default()),
                    query,
                };
                self.query_from(ctx, request, peer_id).await?
            }
        };

        let mut next = HistoryResult::new(self.clone(), result.query.clone(), result.peer_id, body);
        next.started = true;
        Ok(next)
    }

    /// Return the first message, in page order, that matches the predicate. Stops fetching
    /// pages as soon as a match is found.
    pub async fn find<F>(
        &self,
        ctx: &CancellationToken,
        query: StoreQuery,
        mut predicate: F,
        options: QueryOptions,
    ) -> Result<Option<WakuMessage>, StoreError>
    where
        F: FnMut(&WakuMessage) -> bool,
    {
        let mut result = self.query(ctx, query, options).await?;

        loop {
            if let Some(message) = result.messages.iter().find(|&message| predicate(message)) {
                return Ok(Some(message.clone()));
            }

            if result.is_complete() {
                return Ok(None);
            }

            result = self.next(ctx, &result).await?;
        }
    }

    /// Exchange one request and response with `peer_id` over a new stream.
    pub(crate) async fn query_from(
        &self,
        ctx: &CancellationToken,
        request: HistoryRequest,
        peer_id: PeerId,
    ) -> Result<HistoryResponseBody, StoreError> {
        debug!("querying message history with peer {peer_id}");

        let request_id = request.request_id.clone();
        let exchange = async {
            let mut stream = self
                .transport()
                .open_stream(peer_id, PROTOCOL_ID)
                .await
                .map_err(|err| {
                    error!("failed to connect to remote peer {peer_id}: {err}");
                    err
                })?;

            self.codec()
                .write_request(&mut stream, request)
                .await
                .map_err(|err| {
                    error!("could not write request to {peer_id}: {err}");
                    err
                })?;

            self.codec().read_response(&mut stream).await.map_err(|err| {
                error!("could not read response from {peer_id}: {err}");
                StoreError::from(err)
            })
        };

        let bounded = async {
            match self.config().request_timeout() {
                Some(timeout) => tokio::time::timeout(timeout, exchange)
                    .await
                    .map_err(|_| StoreError::Timeout)?,
                None => exchange.await,
            }
        };

        let response = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(StoreError::Cancelled),
            response = bounded => response?,
        };

        validate_response(&response, &request_id)?;
        response.result.map_err(StoreError::from)
    }

    /// The pubsub topics the query targets: the explicit one, or those the content topics are
    /// autosharded to.
    fn resolve_pubsub_topics(&self, query: &HistoryQuery) -> Result<Vec<PubsubTopic>, StoreError> {
        if let Some(topic) = &query.pubsub_topic {
            return Ok(vec![topic.clone()]);
        }

        let mut topics: Vec<PubsubTopic> = Vec::new();
        for content_topic in &query.content_topics {
            let topic = pubsub_topic_from_content_topic(content_topic)?;
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }

        Ok(topics)
    }

    async fn resolve_peer(
        &self,
        target: &PeerTarget,
        pubsub_topics: &[PubsubTopic],
    ) -> Result<PeerId, StoreError> {
        let (selection, preferred) = match target {
            PeerTarget::Peer(peer_id) => return Ok(*peer_id),
            PeerTarget::Address(address) => {
                let peer_manager = self.peer_manager().ok_or(StoreError::NoPeersAvailable)?;
                let peer = peer_manager.add_peer(
                    address.clone(),
                    PeerOrigin::Static,
                    pubsub_topics,
                    PROTOCOL_ID,
                )?;
                peer_manager.connect(&peer).await?;
                return Ok(peer.peer_id);
            }
            PeerTarget::Automatic(preferred) => (PeerSelection::Automatic, preferred),
            PeerTarget::Fastest(preferred) => (PeerSelection::LowestRtt, preferred),
        };

        let peer_manager = self.peer_manager().ok_or(StoreError::NoPeersAvailable)?;
        let criteria = PeerSelectionCriteria {
            selection,
            protocol: PROTOCOL_ID,
            pubsub_topics: pubsub_topics.to_vec(),
            specific_peers: preferred.clone(),
        };

        peer_manager
            .select_peer(criteria)
            .await
            .map_err(|err| match err {
                PeerManagerError::NoPeerFound => StoreError::NoPeersAvailable,
                err => err.into(),
            })
    }
}
