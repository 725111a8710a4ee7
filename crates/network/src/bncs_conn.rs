//! Chat-service connection codec

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, trace};
use w3net_core::{Result, W3Error};
use w3net_protocol::bncs::{deserialize_client_packet, deserialize_server_packet, Packet};
use w3net_protocol::PacketBuffer;

/// Packet-oriented wrapper around one chat-service TCP stream.
///
/// The chat service reuses several packet ids in both directions, so the
/// read side is direction-explicit: a server holding a connection calls
/// [`BncsConn::next_client_packet`], a client calls
/// [`BncsConn::next_server_packet`].
pub struct BncsConn {
    stream: TcpStream,
    rbuf: BytesMut,
    wbuf: PacketBuffer,
    closed: bool,
}

impl BncsConn {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            rbuf: BytesMut::with_capacity(8192),
            wbuf: PacketBuffer::with_capacity(8192),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reads the next packet sent by a client, waiting at most `deadline`.
    pub async fn next_client_packet(&mut self, deadline: Duration) -> Result<Packet> {
        let frame = self.next_frame(deadline).await?;
        let mut buf = PacketBuffer::from(&frame[..]);
        let (pkt, consumed) = deserialize_client_packet(&mut buf)?;
        trace!(consumed, "received client packet");
        Ok(pkt)
    }

    /// Reads the next packet sent by a server, waiting at most `deadline`.
    pub async fn next_server_packet(&mut self, deadline: Duration) -> Result<Packet> {
        let frame = self.next_frame(deadline).await?;
        let mut buf = PacketBuffer::from(&frame[..]);
        let (pkt, consumed) = deserialize_server_packet(&mut buf)?;
        trace!(consumed, "received server packet");
        Ok(pkt)
    }

    async fn next_frame(&mut self, deadline: Duration) -> Result<BytesMut> {
        if self.closed {
            return Err(W3Error::ConnectionClosed);
        }

        match tokio::time::timeout(
            deadline,
            crate::read_frame(&mut self.stream, &mut self.rbuf),
        )
        .await
        {
            Ok(Ok(frame)) => Ok(frame),
            Ok(Err(e)) => {
                self.closed = true;
                Err(e)
            }
            Err(_) => Err(W3Error::Timeout),
        }
    }

    /// Serializes `pkt` into the internal scratch buffer and writes it out
    /// in one piece. Returns the frame size.
    pub async fn send(&mut self, pkt: &Packet) -> Result<usize> {
        if self.closed {
            return Err(W3Error::ConnectionClosed);
        }

        self.wbuf.clear();
        let n = pkt.serialize(&mut self.wbuf)?;

        if let Err(e) = self.stream.write_all(self.wbuf.as_slice()).await {
            self.closed = true;
            return Err(e.into());
        }
        trace!(bytes = n, "sent chat packet");
        Ok(n)
    }

    /// Shuts the stream down and flips the codec to closed.
    pub async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.stream.shutdown().await;
            debug!("chat connection closed");
        }
    }
}
