use libp2p::{Multiaddr, PeerId};

use crate::error::StoreError;
use crate::pagination::{Direction, PageCursor};
use crate::protocol::DEFAULT_PAGE_SIZE;

/// Which store node a query goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerTarget {
    /// A random suitable peer, optionally restricted to the preferred ones.
    Automatic(Vec<PeerId>),
    /// The suitable peer with the lowest round-trip time, optionally restricted to the
    /// preferred ones.
    Fastest(Vec<PeerId>),
    Peer(PeerId),
    /// A peer that is added to the peer directory and connected before the query.
    Address(Multiaddr),
}

impl Default for PeerTarget {
    fn default() -> Self {
        PeerTarget::Automatic(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub peer: PeerTarget,
    /// Generated per request when unset.
    pub request_id: Option<Vec<u8>>,
    pub cursor: Option<PageCursor>,
    pub page_size: u64,
    pub direction: Direction,
    /// Answer from the local message store instead of a remote peer.
    pub local_query: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            peer: PeerTarget::default(),
            request_id: None,
            cursor: None,
            page_size: DEFAULT_PAGE_SIZE,
            direction: Direction::Forward,
            local_query: false,
        }
    }
}

impl QueryOptions {
    pub fn builder() -> QueryOptionsBuilder {
        QueryOptionsBuilder::new()
    }
}

#[derive(Debug, Default)]
pub struct QueryOptionsBuilder {
    options: QueryOptions,
    peer: Option<PeerId>,
    peer_addr: Option<Multiaddr>,
}

impl QueryOptionsBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn build(&self) -> Result<QueryOptions, StoreError> {
        let mut options = self.options.clone();

        match (&self.peer, &self.peer_addr) {
            (Some(_), Some(_)) => return Err(StoreError::PeerSelectionConflict),
            (Some(peer), None) => options.peer = PeerTarget::Peer(*peer),
            (None, Some(addr)) => options.peer = PeerTarget::Address(addr.clone()),
            (None, None) => {}
        }

        Ok(options)
    }

    pub fn peer(&mut self, peer: PeerId) -> &mut Self {
        self.peer = Some(peer);
        self
    }

    pub fn peer_addr(&mut self, address: Multiaddr) -> &mut Self {
        self.peer_addr = Some(address);
        self
    }

    pub fn automatic_peer_selection(&mut self, preferred: Vec<PeerId>) -> &mut Self {
        self.options.peer = PeerTarget::Automatic(preferred);
        self
    }

    pub fn fastest_peer_selection(&mut self, preferred: Vec<PeerId>) -> &mut Self {
        self.options.peer = PeerTarget::Fastest(preferred);
        self
    }

    pub fn request_id(&mut self, request_id: Vec<u8>) -> &mut Self {
        self.options.request_id = Some(request_id);
        self
    }

    pub fn cursor(&mut self, cursor: PageCursor) -> &mut Self {
        self.options.cursor = Some(cursor);
        self
    }

    pub fn paging(&mut self, direction: Direction, page_size: u64) -> &mut Self {
        self.options.direction = direction;
        self.options.page_size = page_size;
        self
    }

    pub fn local_query(&mut self) -> &mut Self {
        self.options.local_query = true;
        self
    }
}
