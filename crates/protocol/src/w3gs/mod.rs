//! # W3GS game-session protocol
//!
//! Framed packets exchanged inside a game connection and embedded in
//! replays. Every message on the wire is
//! `{0xF7, id:u8, length:u16le, body}` where `length` includes the 4-byte
//! header and is back-patched after the body is written.
//!
//! The catalog is a closed sum ([`Packet`]) with one variant per known
//! message plus [`UnknownPacket`], which captures unrecognized frames
//! verbatim for forward compatibility. Deserialization is dispatched
//! through a [`PacketFactory`]; [`DefaultFactory`] maps the id table below.

mod packets;
mod types;

pub use packets::*;
pub use types::*;

use w3net_core::{Encoding, PacketFactory, Result, W3Error};

use crate::PacketBuffer;

/// Leading byte of every framed game-session message.
pub const PROTOCOL_SIG: u8 = 0xF7;

pub const PID_PING_FROM_HOST: u8 = 0x01;
pub const PID_SLOT_INFO_JOIN: u8 = 0x04;
pub const PID_REJECT_JOIN: u8 = 0x05;
pub const PID_PLAYER_INFO: u8 = 0x06;
pub const PID_PLAYER_LEFT: u8 = 0x07;
pub const PID_PLAYER_LOADED: u8 = 0x08;
pub const PID_SLOT_INFO: u8 = 0x09;
pub const PID_COUNT_DOWN_START: u8 = 0x0A;
pub const PID_COUNT_DOWN_END: u8 = 0x0B;
pub const PID_INCOMING_ACTION: u8 = 0x0C;
pub const PID_DESYNC: u8 = 0x0D;
pub const PID_CHAT_FROM_HOST: u8 = 0x0F;
pub const PID_LEAVE_ACK: u8 = 0x1B;
pub const PID_REQ_JOIN: u8 = 0x1E;
pub const PID_LEAVE_REQ: u8 = 0x21;
pub const PID_GAME_LOADED_SELF: u8 = 0x23;
pub const PID_CHAT_TO_HOST: u8 = 0x28;
pub const PID_MAP_CHECK: u8 = 0x3D;
pub const PID_MAP_SIZE: u8 = 0x42;
pub const PID_PONG_TO_HOST: u8 = 0x46;
pub const PID_INCOMING_ACTION2: u8 = 0x48;

/// Writes the frame header and returns `(frame_start, length_handle)`.
pub(crate) fn begin_frame(buf: &mut PacketBuffer, pid: u8) -> (usize, usize) {
    let start = buf.size();
    buf.write_u8(PROTOCOL_SIG);
    buf.write_u8(pid);
    let len_at = buf.reserve_u16();
    (start, len_at)
}

/// Patches the frame length and returns the number of bytes written.
pub(crate) fn end_frame(buf: &mut PacketBuffer, start: usize, len_at: usize) -> usize {
    let n = buf.size() - start;
    buf.patch_u16(len_at, n as u16);
    n
}

/// Consumes and validates a frame header, returning `(pid, declared_size)`.
///
/// `min_size` is the smallest whole frame the caller can accept.
pub(crate) fn read_frame_header(buf: &mut PacketBuffer, min_size: usize) -> Result<(u8, usize)> {
    if buf.size() < min_size {
        return Err(W3Error::InvalidPacketSize);
    }
    if buf.read_u8() != PROTOCOL_SIG {
        return Err(W3Error::InvalidChecksum);
    }
    let pid = buf.read_u8();
    let size = buf.read_u16() as usize;
    if size < min_size || buf.size() + 4 < size {
        return Err(W3Error::InvalidPacketSize);
    }
    Ok((pid, size))
}

/// Maps the id table to fresh packet values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl PacketFactory<Packet> for DefaultFactory {
    fn new_instance(&self, tag: u8, _enc: &Encoding) -> Option<Packet> {
        Some(match tag {
            PID_PING_FROM_HOST => Packet::Ping(Ping::default()),
            PID_SLOT_INFO_JOIN => Packet::SlotInfoJoin(SlotInfoJoin::default()),
            PID_REJECT_JOIN => Packet::RejectJoin(RejectJoin::default()),
            PID_PLAYER_INFO => Packet::PlayerInfo(PlayerInfo::default()),
            PID_PLAYER_LEFT => Packet::PlayerLeft(PlayerLeft::default()),
            PID_PLAYER_LOADED => Packet::PlayerLoaded(PlayerLoaded::default()),
            PID_SLOT_INFO => Packet::SlotInfo(SlotInfo::default()),
            PID_COUNT_DOWN_START => Packet::CountDownStart(CountDownStart),
            PID_COUNT_DOWN_END => Packet::CountDownEnd(CountDownEnd),
            PID_INCOMING_ACTION | PID_INCOMING_ACTION2 => Packet::TimeSlot(TimeSlot::default()),
            PID_DESYNC => Packet::Desync(Desync::default()),
            PID_CHAT_FROM_HOST => Packet::MessageRelay(MessageRelay::default()),
            PID_LEAVE_ACK => Packet::LeaveAck(LeaveAck),
            PID_REQ_JOIN => Packet::Join(Join::default()),
            PID_LEAVE_REQ => Packet::Leave(Leave::default()),
            PID_GAME_LOADED_SELF => Packet::GameLoaded(GameLoaded),
            PID_CHAT_TO_HOST => Packet::Message(Message::default()),
            PID_MAP_CHECK => Packet::MapCheck(MapCheck::default()),
            PID_MAP_SIZE => Packet::MapState(MapState::default()),
            _ => return None,
        })
    }
}

/// Serializes one framed packet and returns the bytes written.
pub fn serialize_packet(buf: &mut PacketBuffer, pkt: &Packet, enc: &Encoding) -> Result<usize> {
    pkt.serialize(buf, enc)
}

/// Deserializes the next framed packet using [`DefaultFactory`].
pub fn deserialize_packet(buf: &mut PacketBuffer, enc: &Encoding) -> Result<(Packet, usize)> {
    deserialize_packet_with(buf, enc, &DefaultFactory)
}

/// Deserializes the next framed packet, consulting `factory` for the
/// variant. Unknown ids fall back to a verbatim [`UnknownPacket`] capture;
/// a frame whose body is not consumed exactly is an error.
pub fn deserialize_packet_with<F>(
    buf: &mut PacketBuffer,
    enc: &Encoding,
    factory: &F,
) -> Result<(Packet, usize)>
where
    F: PacketFactory<Packet>,
{
    if buf.size() < 4 {
        return Err(W3Error::InvalidPacketSize);
    }
    let head = buf.as_slice();
    if head[0] != PROTOCOL_SIG {
        return Err(W3Error::InvalidChecksum);
    }
    let pid = head[1];
    let size = u16::from_le_bytes([head[2], head[3]]) as usize;
    if size < 4 || buf.size() < size {
        return Err(W3Error::InvalidPacketSize);
    }

    let before = buf.size();
    let mut pkt = factory
        .new_instance(pid, enc)
        .unwrap_or_else(|| Packet::Unknown(UnknownPacket::default()));
    pkt.deserialize(buf, enc)?;

    if before - buf.size() != size {
        return Err(W3Error::InvalidPacketSize);
    }
    Ok((pkt, size))
}
