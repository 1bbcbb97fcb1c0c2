use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::codec::WakuStoreCodec;
use crate::config::StoreConfig;
use crate::envelope::Envelope;
use crate::peer_manager::PeerManager;
use crate::provider::MessageProvider;
use crate::server;
use crate::timesource::{Timesource, WallClockTimesource};
use crate::transport::StreamTransport;

struct Running {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

struct Inner {
    config: StoreConfig,
    codec: WakuStoreCodec,
    transport: Arc<dyn StreamTransport>,
    peer_manager: Option<Arc<dyn PeerManager>>,
    provider: Option<Arc<dyn MessageProvider>>,
    timesource: Arc<dyn Timesource>,
    running: Mutex<Option<Running>>,
    started: AtomicBool,
}

/// The store protocol node: serves history queries from the local message provider, queries
/// remote store nodes and resumes the history after being offline.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct WakuStore {
    inner: Arc<Inner>,
}

impl WakuStore {
    pub fn builder(transport: Arc<dyn StreamTransport>) -> WakuStoreBuilder {
        WakuStoreBuilder::new(transport)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn message_provider(&self) -> Option<&Arc<dyn MessageProvider>> {
        self.inner.provider.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    pub(crate) fn codec(&self) -> &WakuStoreCodec {
        &self.inner.codec
    }

    pub(crate) fn transport(&self) -> &Arc<dyn StreamTransport> {
        &self.inner.transport
    }

    pub(crate) fn peer_manager(&self) -> Option<&Arc<dyn PeerManager>> {
        self.inner.peer_manager.as_ref()
    }

    pub(crate) fn timesource(&self) -> &Arc<dyn Timesource> {
        &self.inner.timesource
    }

    /// Start serving history queries and persisting the envelopes received on `messages`.
    ///
    /// Without a message provider there is nothing to serve, and the node stays stopped.
    pub async fn start(&self, messages: mpsc::Receiver<Envelope>) {
        let mut running = self.inner.running.lock().await;
        if running.is_some() {
            return;
        }

        if self.inner.provider.is_none() {
            info!("store protocol started (no message provider)");
            return;
        }

        let cancel = CancellationToken::new();
        let tasks = vec![
            tokio::spawn(server::accept_loop(self.clone(), cancel.clone())),
            tokio::spawn(server::ingest_loop(self.clone(), messages, cancel.clone())),
        ];

        *running = Some(Running { cancel, tasks });
        self.inner.started.store(true, Ordering::SeqCst);

        info!("store protocol started");
    }

    /// Stop serving and wait for the background tasks to finish.
    pub async fn stop(&self) {
        let mut running = self.inner.running.lock().await;
        let Some(Running { cancel, tasks }) = running.take() else {
            return;
        };

        self.inner.started.store(false, Ordering::SeqCst);
        cancel.cancel();

        for task in tasks {
            if let Err(err) = task.await {
                error!("store background task failed: {err}");
            }
        }

        debug!("store protocol stopped");
    }
}

pub struct WakuStoreBuilder {
    config: StoreConfig,
    transport: Arc<dyn StreamTransport>,
    peer_manager: Option<Arc<dyn PeerManager>>,
    provider: Option<Arc<dyn MessageProvider>>,
    timesource: Arc<dyn Timesource>,
}

impl WakuStoreBuilder {
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            config: StoreConfig::default(),
            transport,
            peer_manager: None,
            provider: None,
            timesource: Arc::new(WallClockTimesource),
        }
    }

    pub fn build(&self) -> WakuStore {
        WakuStore {
            inner: Arc::new(Inner {
                config: self.config.clone(),
                codec: WakuStoreCodec::new(self.config.max_frame_size),
                transport: self.transport.clone(),
                peer_manager: self.peer_manager.clone(),
                provider: self.provider.clone(),
                timesource: self.timesource.clone(),
                running: Mutex::new(None),
                started: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&mut self, config: StoreConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn message_provider(&mut self, provider: Arc<dyn MessageProvider>) -> &mut Self {
        self.provider = Some(provider);
        self
    }

    pub fn peer_manager(&mut self, peer_manager: Arc<dyn PeerManager>) -> &mut Self {
        self.peer_manager = Some(peer_manager);
        self
    }

    pub fn timesource(&mut self, timesource: Arc<dyn Timesource>) -> &mut Self {
        self.timesource = timesource;
        self
    }
}
