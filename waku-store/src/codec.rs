use std::io;

use asynchronous_codec::{FramedRead, FramedWrite};
use futures::{AsyncRead, AsyncWrite, SinkExt, StreamExt};

use waku_core::common::protobuf_codec;

use crate::protocol::MAX_PROTOBUF_SIZE;
use crate::request::HistoryRequest;
use crate::response::HistoryResponse;
use crate::rpc::HistoryRpc;

/// The `WakuStoreCodec` reads and writes the single length-prefixed history frame exchanged in
/// each direction of a store stream.
#[derive(Debug, Clone, Copy)]
pub struct WakuStoreCodec {
    max_frame_size: usize,
}

impl Default for WakuStoreCodec {
    fn default() -> Self {
        Self::new(MAX_PROTOBUF_SIZE)
    }
}

impl WakuStoreCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn codec(&self) -> protobuf_codec::Codec<HistoryRpc> {
        protobuf_codec::Codec::new(self.max_frame_size)
    }

    pub async fn read_rpc<T>(&self, io: &mut T) -> io::Result<HistoryRpc>
    where
        T: AsyncRead + Unpin,
    {
        FramedRead::new(io, self.codec())
            .next()
            .await
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?
    }

    /// Send one frame and close the write side of the stream.
    pub async fn write_rpc<T>(&self, io: &mut T, rpc: HistoryRpc) -> io::Result<()>
    where
        T: AsyncWrite + Unpin,
    {
        let mut framed_io = FramedWrite::new(io, self.codec());

        framed_io.send(rpc).await?;
        framed_io.close().await?;
        Ok(())
    }

    pub async fn read_request<T>(&self, io: &mut T) -> io::Result<HistoryRequest>
    where
        T: AsyncRead + Unpin,
    {
        let rpc = self.read_rpc(io).await?;
        HistoryRequest::try_from(rpc).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    pub async fn read_response<T>(&self, io: &mut T) -> io::Result<HistoryResponse>
    where
        T: AsyncRead + Unpin,
    {
        let rpc = self.read_rpc(io).await?;
        Ok(rpc.into())
    }

    pub async fn write_request<T>(&self, io: &mut T, request: HistoryRequest) -> io::Result<()>
    where
        T: AsyncWrite + Unpin,
    {
        self.write_rpc(io, request.into()).await
    }

    pub async fn write_response<T>(&self, io: &mut T, response: HistoryResponse) -> io::Result<()>
    where
        T: AsyncWrite + Unpin,
    {
        self.write_rpc(io, response.into()).await
    }
}
