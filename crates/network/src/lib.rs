//! # w3net Network Library
//!
//! Deadline-bounded connection codecs wrapping a TCP stream with the
//! framing rules of the two protocols. The codecs own no policy: a read
//! either yields one whole packet, reports a timeout, or reports the
//! terminal condition that closed the connection. Retries, reconnects,
//! and event dispatch belong to the caller.
//!
//! ## State machine
//!
//! `OPEN -> CLOSED` on [`BncsConn::close`] / [`W3gsConn::close`] or on a
//! terminal I/O error (EOF included). Closed codecs reject every further
//! operation with [`w3net_core::W3Error::ConnectionClosed`]. A timeout is
//! NOT terminal; the stream is left exactly as it was and the read can be
//! reissued.

mod bncs_conn;
mod w3gs_conn;

pub use bncs_conn::*;
pub use w3gs_conn::*;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use w3net_core::{Result, W3Error};

/// Accumulates stream data until one whole `{sig, id, len:u16le}` frame is
/// buffered, then splits it off. Returns [`W3Error::ConnectionClosed`] on
/// EOF.
pub(crate) async fn read_frame(stream: &mut TcpStream, rbuf: &mut BytesMut) -> Result<BytesMut> {
    loop {
        if rbuf.len() >= 4 {
            let declared = u16::from_le_bytes([rbuf[2], rbuf[3]]) as usize;
            let need = declared.max(4);
            if rbuf.len() >= need {
                return Ok(rbuf.split_to(need));
            }
        }

        let n = stream.read_buf(rbuf).await?;
        if n == 0 {
            return Err(W3Error::ConnectionClosed);
        }
    }
}
