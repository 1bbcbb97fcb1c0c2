#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use libp2p::identity::Keypair;
use libp2p::{Multiaddr, PeerId};
use tokio::sync::mpsc;
use tokio_util::compat::TokioAsyncReadCompatExt;

use waku_core::content_topic::ContentTopic;
use waku_core::message::WakuMessage;
use waku_core::pubsub_topic::PubsubTopic;
use waku_store::{
    BoxedStream, Envelope, MemoryMessageProvider, MemoryProviderConfig, MessageProvider, PeerData,
    PeerManager, PeerManagerError, PeerOrigin, PeerSelectionCriteria, StoreConfig,
    StreamTransport, Timesource, WakuStore,
};

pub const SECOND: i64 = 1_000_000_000;

/// The fixed "now" of every test node, in nanoseconds.
pub const NOW: i64 = 1_700_000_000 * SECOND;

pub const TEST_CONTENT_TOPIC: &str = "/toychat/2/huilong/proto";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn new_peer_id() -> PeerId {
    PeerId::from(&Keypair::generate_secp256k1().public())
}

pub fn test_message(payload: &str, timestamp: i64) -> WakuMessage {
    WakuMessage {
        payload: Bytes::copy_from_slice(payload.as_bytes()),
        content_topic: ContentTopic::new(TEST_CONTENT_TOPIC),
        timestamp: Some(timestamp),
        ..Default::default()
    }
}

/// Messages `m1..=mN`, one second apart and ending one second before [`NOW`].
pub fn test_messages(count: i64) -> Vec<WakuMessage> {
    (1..=count)
        .map(|i| test_message(&format!("m{i}"), NOW - (count - i + 1) * SECOND))
        .collect()
}

pub fn payloads(messages: &[WakuMessage]) -> Vec<String> {
    messages
        .iter()
        .map(|m| String::from_utf8_lossy(&m.payload).into_owned())
        .collect()
}

pub struct FixedTimesource(pub i64);

impl Timesource for FixedTimesource {
    fn now(&self) -> i64 {
        self.0
    }
}

#[derive(Default)]
struct NetworkState {
    listeners: HashMap<PeerId, mpsc::UnboundedSender<(PeerId, BoxedStream)>>,
    offline: HashSet<PeerId>,
    dials: Vec<PeerId>,
}

/// An in-process network of stream transports backed by in-memory pipes.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn transport(&self, local_peer_id: PeerId) -> Arc<MemoryTransport> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state
            .lock()
            .unwrap()
            .listeners
            .insert(local_peer_id, sender);

        Arc::new(MemoryTransport {
            local_peer_id,
            network: self.clone(),
            inbound: tokio::sync::Mutex::new(receiver),
        })
    }

    /// Refuse every further stream to `peer_id`.
    pub fn disconnect(&self, peer_id: PeerId) {
        self.state.lock().unwrap().offline.insert(peer_id);
    }

    pub fn dial_count(&self, peer_id: PeerId) -> usize {
        self.state
            .lock()
            .unwrap()
            .dials
            .iter()
            .filter(|dialed| **dialed == peer_id)
            .count()
    }

    pub fn total_dials(&self) -> usize {
        self.state.lock().unwrap().dials.len()
    }
}

pub struct MemoryTransport {
    local_peer_id: PeerId,
    network: MemoryNetwork,
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<(PeerId, BoxedStream)>>,
}

impl MemoryTransport {
    pub fn local_peer_id(&self) -> PeerId {
        self.local_peer_id
    }
}

#[async_trait]
impl StreamTransport for MemoryTransport {
    async fn open_stream(
        &self,
        peer_id: PeerId,
        _protocol: &'static str,
    ) -> io::Result<BoxedStream> {
        let mut state = self.network.state.lock().unwrap();
        state.dials.push(peer_id);

        if state.offline.contains(&peer_id) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "peer unreachable",
            ));
        }

        let listener = state
            .listeners
            .get(&peer_id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "unknown peer"))?;

        let (local, remote) = tokio::io::duplex(64 * 1024);
        let remote: BoxedStream = Box::new(remote.compat());
        listener
            .send((self.local_peer_id, remote))
            .map_err(|_| io::Error::from(io::ErrorKind::ConnectionRefused))?;

        Ok(Box::new(local.compat()))
    }

    async fn accept_stream(&self, _protocol: &'static str) -> Option<(PeerId, BoxedStream)> {
        self.inbound.lock().await.recv().await
    }
}

/// A peer directory with a fixed set of peers and known addresses.
#[derive(Default)]
pub struct StaticPeerManager {
    peers: Mutex<Vec<PeerId>>,
    addresses: Mutex<HashMap<Multiaddr, PeerId>>,
    connected: Mutex<Vec<PeerId>>,
    selections: Mutex<Vec<PeerSelectionCriteria>>,
}

impl StaticPeerManager {
    pub fn with_peers(peers: Vec<PeerId>) -> Self {
        Self {
            peers: Mutex::new(peers),
            ..Default::default()
        }
    }

    pub fn with_address(self, address: Multiaddr, peer_id: PeerId) -> Self {
        self.addresses.lock().unwrap().insert(address, peer_id);
        self
    }

    pub fn connected(&self) -> Vec<PeerId> {
        self.connected.lock().unwrap().clone()
    }

    pub fn selections(&self) -> Vec<PeerSelectionCriteria> {
        self.selections.lock().unwrap().clone()
    }
}

#[async_trait]
impl PeerManager for StaticPeerManager {
    async fn select_peer(
        &self,
        criteria: PeerSelectionCriteria,
    ) -> Result<PeerId, PeerManagerError> {
        let peers = self.peers.lock().unwrap().clone();
        let selected = peers
            .into_iter()
            .find(|peer| criteria.specific_peers.is_empty() || criteria.specific_peers.contains(peer));

        self.selections.lock().unwrap().push(criteria);
        selected.ok_or(PeerManagerError::NoPeerFound)
    }

    fn add_peer(
        &self,
        address: Multiaddr,
        origin: PeerOrigin,
        _pubsub_topics: &[PubsubTopic],
        _protocol: &'static str,
    ) -> Result<PeerData, PeerManagerError> {
        let peer_id = *self
            .addresses
            .lock()
            .unwrap()
            .get(&address)
            .ok_or_else(|| PeerManagerError::InvalidAddress(address.clone()))?;

        self.peers.lock().unwrap().push(peer_id);
        Ok(PeerData {
            peer_id,
            addresses: vec![address],
            origin,
        })
    }

    async fn connect(&self, peer: &PeerData) -> Result<(), PeerManagerError> {
        self.connected.lock().unwrap().push(peer.peer_id);
        Ok(())
    }
}

/// A store node backed by an in-memory message provider.
pub struct TestNode {
    pub peer_id: PeerId,
    pub store: WakuStore,
    pub provider: Arc<MemoryMessageProvider>,
    pub messages: mpsc::Sender<Envelope>,
    pub transport: Arc<MemoryTransport>,
}

impl TestNode {
    pub async fn seed(&self, messages: &[WakuMessage]) {
        for message in messages {
            let envelope = Envelope::new(message.clone(), NOW, PubsubTopic::default());
            self.provider.put(&envelope).await.unwrap();
        }
    }

    /// Wait until the provider holds `count` messages.
    pub async fn wait_for_count(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.provider.count().await.unwrap() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("messages were not stored in time");
    }
}

pub fn new_store_node_unstarted(network: &MemoryNetwork, config: StoreConfig) -> TestNode {
    let peer_id = new_peer_id();
    let transport = network.transport(peer_id);
    let timesource = Arc::new(FixedTimesource(NOW));
    let provider = Arc::new(MemoryMessageProvider::with_timesource(
        MemoryProviderConfig::default(),
        timesource.clone(),
    ));

    let store = WakuStore::builder(transport.clone())
        .config(config)
        .message_provider(provider.clone())
        .timesource(timesource)
        .build();

    // Replaced on start.
    let (messages, _) = mpsc::channel(1);

    TestNode {
        peer_id,
        store,
        provider,
        messages,
        transport,
    }
}

pub async fn new_store_node(network: &MemoryNetwork, config: StoreConfig) -> TestNode {
    let mut node = new_store_node_unstarted(network, config);
    node.messages = start_node(&node).await;
    node
}

pub async fn start_node(node: &TestNode) -> mpsc::Sender<Envelope> {
    let (sender, receiver) = mpsc::channel(100);
    node.store.start(receiver).await;
    sender
}

/// A store node without a message provider, used purely as a client.
pub fn new_client(
    network: &MemoryNetwork,
    peer_manager: Option<Arc<dyn PeerManager>>,
    config: StoreConfig,
) -> WakuStore {
    let transport = network.transport(new_peer_id());

    let mut builder = WakuStore::builder(transport);
    builder
        .config(config)
        .timesource(Arc::new(FixedTimesource(NOW)));
    if let Some(peer_manager) = peer_manager {
        builder.peer_manager(peer_manager);
    }

    builder.build()
}

/// A started store node serving history from `provider`.
pub async fn new_provider_node(
    network: &MemoryNetwork,
    peer_id: PeerId,
    config: StoreConfig,
    provider: Arc<dyn MessageProvider>,
) -> WakuStore {
    let store = WakuStore::builder(network.transport(peer_id))
        .config(config)
        .message_provider(provider)
        .timesource(Arc::new(FixedTimesource(NOW)))
        .build();

    let (_, receiver) = mpsc::channel(1);
    store.start(receiver).await;
    store
}
