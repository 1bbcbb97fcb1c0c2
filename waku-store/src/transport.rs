use std::io;

use async_trait::async_trait;
use futures::{AsyncRead, AsyncWrite};
use libp2p::PeerId;

/// A bidirectional byte stream negotiated for one protocol.
///
/// Closing the write side ends the exchange gracefully; dropping the stream without closing it
/// resets it.
pub trait StoreStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> StoreStream for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

pub type BoxedStream = Box<dyn StoreStream>;

/// The stream-oriented transport the store protocol runs on.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Dial `peer_id` and negotiate `protocol` on a new stream.
    async fn open_stream(&self, peer_id: PeerId, protocol: &'static str)
        -> io::Result<BoxedStream>;

    /// Wait for the next inbound stream negotiated for `protocol`. `None` once the transport
    /// has shut down. Must be cancel safe: dropping the returned future must not lose a stream.
    async fn accept_stream(&self, protocol: &'static str) -> Option<(PeerId, BoxedStream)>;
}
