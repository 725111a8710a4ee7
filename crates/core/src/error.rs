//! Core error types for w3net
//!
//! The codec layers surface a flat taxonomy: every failure mode is a
//! distinct sentinel that callers can match on. There is no recovery at
//! this level; the only "soft" path is the unknown-packet fallback in the
//! framing code, which is forward compatibility rather than a masked error.

#[derive(thiserror::Error, Debug)]
pub enum W3Error {
    /// Buffer too short for the declared or minimum packet size, or a
    /// framed payload that was not consumed exactly.
    #[error("invalid packet size")]
    InvalidPacketSize,

    /// Protocol signature or checksum mismatch on a framed message.
    #[error("invalid checksum")]
    InvalidChecksum,

    /// Payload violates the structural rules of its packet or record.
    #[error("malformed payload")]
    BadFormat,

    /// A field the protocol fixes to a constant held something else.
    #[error("unexpected constant")]
    UnexpectedConst,

    /// An IPv4 field was asked to carry a non-IPv4 address.
    #[error("invalid IPv4 address")]
    InvalidIp4,

    /// A zero-terminated string ran off the end of the buffer.
    #[error("no string terminator found in buffer")]
    NoStringTerminator,

    /// A packet arrived that the current conversation state cannot accept.
    #[error("unexpected packet")]
    UnexpectedPacket,

    /// No constructor is registered for this tag.
    #[error("no factory for packet type")]
    NoFactory,

    /// Operation on a codec that has already transitioned to closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Deadline expired before a full packet arrived.
    #[error("deadline expired")]
    Timeout,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, W3Error>;

impl PartialEq for W3Error {
    fn eq(&self, other: &Self) -> bool {
        use W3Error::*;
        match (self, other) {
            (InvalidPacketSize, InvalidPacketSize)
            | (InvalidChecksum, InvalidChecksum)
            | (BadFormat, BadFormat)
            | (UnexpectedConst, UnexpectedConst)
            | (InvalidIp4, InvalidIp4)
            | (NoStringTerminator, NoStringTerminator)
            | (UnexpectedPacket, UnexpectedPacket)
            | (NoFactory, NoFactory)
            | (ConnectionClosed, ConnectionClosed)
            | (Timeout, Timeout) => true,
            (Io(a), Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
