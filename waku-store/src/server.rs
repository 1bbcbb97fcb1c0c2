use libp2p::PeerId;
use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::envelope::Envelope;
use crate::error::StoreError;
use crate::pagination::PagingInfo;
use crate::protocol::PROTOCOL_ID;
use crate::provider::{ProviderError, StoredMessage};
use crate::request::HistoryQuery;
use crate::response::{HistoryErrorKind, HistoryResponse, HistoryResponseBody};
use crate::store::WakuStore;
use crate::transport::BoxedStream;
use crate::validation::validate_request;

pub(crate) async fn accept_loop(store: WakuStore, cancel: CancellationToken) {
    let mut handlers = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = store.transport().accept_stream(PROTOCOL_ID) => match accepted {
                Some((peer_id, stream)) => {
                    let store = store.clone();
                    handlers.spawn(async move { store.on_request(peer_id, stream).await });
                }
                None => {
                    debug!("transport closed. terminating store accept loop");
                    break;
                }
            },
            Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
        }
    }

    // Dropping the in-flight streams resets them.
    handlers.shutdown().await;
}

pub(crate) async fn ingest_loop(
    store: WakuStore,
    mut messages: mpsc::Receiver<Envelope>,
    cancel: CancellationToken,
) {
    loop {
        let envelope = tokio::select! {
            _ = cancel.cancelled() => break,
            envelope = messages.recv() => match envelope {
                Some(envelope) => envelope,
                None => {
                    debug!("message feed closed. terminating store ingestion loop");
                    break;
                }
            },
        };

        if let Err(err) = store.store_message(&envelope).await {
            error!("failed to store message: {err}");
        }
    }
}

impl WakuStore {
    /// Answer one inbound history query. Any failure before the response is written drops the
    /// stream, resetting it.
    async fn on_request(&self, peer_id: PeerId, mut stream: BoxedStream) {
        let read = self.codec().read_request(&mut stream);
        let read = match self.config().request_timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, read).await {
                Ok(read) => read,
                Err(_) => {
                    error!("{peer_id} sent no request within {timeout:?}");
                    return;
                }
            },
            None => read.await,
        };

        let request = match read {
            Ok(request) => request,
            Err(err) => {
                error!("reading request from {peer_id} failed: {err}");
                return;
            }
        };

        info!(
            "{peer_id} queried for messages, request_id={}",
            request.request_id
        );

        if let Err(err) = validate_request(&request) {
            error!("invalid request from {peer_id}: {err}");
            return;
        }

        let result = match self.find_messages(request.query).await {
            Ok(body) => Ok(body),
            Err(StoreError::InvalidCursor) => Err(HistoryErrorKind::InvalidCursor),
            Err(err) => {
                error!("query from {peer_id} failed: {err}");
                return;
            }
        };

        let response = HistoryResponse {
            request_id: request.request_id,
            result,
        };
        let request_id = response.request_id.clone();

        if let Err(err) = self.codec().write_response(&mut stream, response).await {
            error!("writing response to {peer_id} failed: {err}");
            return;
        }

        info!("response sent to {peer_id}, request_id={request_id}");
    }

    /// Run a query against the local message provider, with the paging normalised the same way
    /// remote queries are.
    pub async fn find_messages(
        &self,
        mut query: HistoryQuery,
    ) -> Result<HistoryResponseBody, StoreError> {
        let provider = self.message_provider().ok_or(StoreError::NotStarted)?;

        let paging = query.paging();
        query.paging_info = Some(PagingInfo {
            page_size: self.config().clamp_page_size(paging.page_size),
            ..paging
        });

        let (next_page, stored) = provider.query(&query).await.map_err(|err| match err {
            ProviderError::InvalidCursor => StoreError::InvalidCursor,
            err => StoreError::Provider(err),
        })?;

        Ok(HistoryResponseBody {
            messages: stored.into_iter().map(|stored: StoredMessage| stored.message).collect(),
            next_page,
        })
    }

    /// Persist one envelope. Returns whether the message was newly stored: ephemeral messages
    /// and messages already present are skipped.
    pub(crate) async fn store_message(&self, envelope: &Envelope) -> Result<bool, StoreError> {
        if envelope.message().ephemeral {
            return Ok(false);
        }

        let provider = self.message_provider().ok_or(StoreError::NotStarted)?;
        provider.validate(envelope)?;

        match provider.put(envelope).await {
            Ok(()) => Ok(true),
            Err(ProviderError::DuplicateMessage) => {
                debug!(
                    "message already stored: {}",
                    hex::encode(envelope.digest())
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}
