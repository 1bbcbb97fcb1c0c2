use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId};

use waku_core::pubsub_topic::PubsubTopic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerSelection {
    /// Any suitable peer, picked at random.
    #[default]
    Automatic,
    /// The suitable peer with the lowest measured round-trip time.
    LowestRtt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSelectionCriteria {
    pub selection: PeerSelection,
    pub protocol: &'static str,
    pub pubsub_topics: Vec<PubsubTopic>,
    /// Restrict the selection to these peers. Empty means any known peer.
    pub specific_peers: Vec<PeerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerOrigin {
    Static,
    Discovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerData {
    pub peer_id: PeerId,
    pub addresses: Vec<Multiaddr>,
    pub origin: PeerOrigin,
}

#[derive(Debug, thiserror::Error)]
pub enum PeerManagerError {
    #[error("no suitable peer found")]
    NoPeerFound,

    #[error("invalid peer address: {0}")]
    InvalidAddress(Multiaddr),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// The peer directory the client consults to pick a store node.
#[async_trait]
pub trait PeerManager: Send + Sync {
    async fn select_peer(
        &self,
        criteria: PeerSelectionCriteria,
    ) -> Result<PeerId, PeerManagerError>;

    /// Register a peer by its address, which must include the `/p2p/` component.
    fn add_peer(
        &self,
        address: Multiaddr,
        origin: PeerOrigin,
        pubsub_topics: &[PubsubTopic],
        protocol: &'static str,
    ) -> Result<PeerData, PeerManagerError>;

    async fn connect(&self, peer: &PeerData) -> Result<(), PeerManagerError>;
}
