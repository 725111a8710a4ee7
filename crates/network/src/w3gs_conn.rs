//! Game-session connection codec

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, trace};
use w3net_core::{Encoding, PacketFactory, Result, W3Error};
use w3net_protocol::w3gs::{deserialize_packet_with, Packet};
use w3net_protocol::PacketBuffer;

/// Packet-oriented wrapper around one game-session TCP stream.
///
/// Reads are bounded by an explicit deadline; a timeout surfaces as
/// [`W3Error::Timeout`] without consuming anything, so the call can simply
/// be reissued. EOF and I/O errors are terminal and flip the codec to
/// closed.
pub struct W3gsConn<F> {
    stream: TcpStream,
    rbuf: BytesMut,
    wbuf: PacketBuffer,
    factory: F,
    pub encoding: Encoding,
    closed: bool,
}

impl<F> W3gsConn<F>
where
    F: PacketFactory<Packet>,
{
    pub fn new(stream: TcpStream, factory: F, encoding: Encoding) -> Self {
        Self {
            stream,
            rbuf: BytesMut::with_capacity(8192),
            wbuf: PacketBuffer::with_capacity(8192),
            factory,
            encoding,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reads the next whole packet, waiting at most `deadline`.
    pub async fn next_packet(&mut self, deadline: Duration) -> Result<Packet> {
        if self.closed {
            return Err(W3Error::ConnectionClosed);
        }

        let frame = match tokio::time::timeout(
            deadline,
            crate::read_frame(&mut self.stream, &mut self.rbuf),
        )
        .await
        {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                self.closed = true;
                return Err(e);
            }
            Err(_) => return Err(W3Error::Timeout),
        };

        let mut buf = PacketBuffer::from(&frame[..]);
        let (pkt, consumed) = deserialize_packet_with(&mut buf, &self.encoding, &self.factory)?;
        trace!(consumed, "received game packet");
        Ok(pkt)
    }

    /// Serializes `pkt` into the internal scratch buffer and writes it out
    /// in one piece. Returns the frame size.
    pub async fn send(&mut self, pkt: &Packet) -> Result<usize> {
        if self.closed {
            return Err(W3Error::ConnectionClosed);
        }

        self.wbuf.clear();
        let n = pkt.serialize(&mut self.wbuf, &self.encoding)?;

        if let Err(e) = self.stream.write_all(self.wbuf.as_slice()).await {
            self.closed = true;
            return Err(e.into());
        }
        trace!(bytes = n, "sent game packet");
        Ok(n)
    }

    /// Shuts the stream down and flips the codec to closed.
    pub async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.stream.shutdown().await;
            debug!("game connection closed");
        }
    }
}
