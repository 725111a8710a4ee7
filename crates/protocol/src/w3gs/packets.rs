//! Framed game-session packets
//!
//! The framed layer over the content codecs in [`super::types`]: each packet
//! writes the protocol signature, its id, and a back-patched length, then
//! delegates the body to plain field writes or an embedded structure's
//! `*_content` methods. Shared structures that travel as packets in their
//! own right (`SlotInfo`, `TimeSlot`, `Desync`, `Message`) get their framed
//! impls here so the content layer stays tag-free.

use w3net_core::{Encoding, Result, W3Error};

use crate::PacketBuffer;

use super::{
    begin_frame, end_frame, read_frame_header, Desync, Message, SlotInfo, SockAddr, TimeSlot,
    LeaveReason, RejectReason, PID_CHAT_FROM_HOST, PID_CHAT_TO_HOST, PID_COUNT_DOWN_END,
    PID_COUNT_DOWN_START, PID_DESYNC, PID_GAME_LOADED_SELF, PID_INCOMING_ACTION,
    PID_INCOMING_ACTION2, PID_LEAVE_ACK, PID_LEAVE_REQ, PID_MAP_CHECK, PID_MAP_SIZE,
    PID_PING_FROM_HOST, PID_PLAYER_INFO, PID_PLAYER_LEFT, PID_PLAYER_LOADED, PID_PONG_TO_HOST,
    PID_REJECT_JOIN, PID_REQ_JOIN, PID_SLOT_INFO, PID_SLOT_INFO_JOIN,
};

/// Unrecognized frame, preserved verbatim.
///
/// `blob` holds the entire frame including the 4-byte header, so an unknown
/// packet can be logged or relayed without loss.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownPacket {
    pub pid: u8,
    pub blob: Vec<u8>,
}

impl UnknownPacket {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        if self.blob.len() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.write_blob(&self.blob);
        Ok(self.blob.len())
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        let head = buf.as_slice();
        let size = u16::from_le_bytes([head[2], head[3]]) as usize;
        if size < 4 || buf.size() < size {
            return Err(W3Error::InvalidPacketSize);
        }
        self.blob = buf.read_blob(size);
        self.pid = self.blob[1];
        Ok(())
    }
}

/// Keep-alive probe from the host [0x01]. The payload is echoed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ping {
    pub payload: u32,
}

impl Ping {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_PING_FROM_HOST);
        buf.write_u32(self.payload);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 8)?;
        if size != 8 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.payload = buf.read_u32();
        Ok(())
    }
}

/// Keep-alive reply to the host [0x46].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pong {
    pub payload: u32,
}

impl Pong {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_PONG_TO_HOST);
        buf.write_u32(self.payload);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 8)?;
        if size != 8 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.payload = buf.read_u32();
        Ok(())
    }
}

/// Join request from a connecting player [0x1E].
///
/// # Packet Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 dword | host counter (game id on the advertising host)
///      1 dword | entry key (must match the advertisement)
///      1 byte  | zero
///      1 word  | listen port (network byte order)
///      1 dword | join counter
///     variable | player name (zero terminated)
///     16 byte  | internal socket address
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Join {
    pub host_counter: u32,
    pub entry_key: u32,
    pub listen_port: u16,
    pub join_counter: u32,
    pub player_name: String,
    pub internal_addr: SockAddr,
}

impl Join {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_REQ_JOIN);
        buf.write_u32(self.host_counter);
        buf.write_u32(self.entry_key);
        buf.write_u8(0);
        buf.write_port(self.listen_port);
        buf.write_u32(self.join_counter);
        buf.write_cstring(&self.player_name);
        self.internal_addr.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 36)?;
        self.host_counter = buf.read_u32();
        self.entry_key = buf.read_u32();
        buf.skip(1);
        self.listen_port = buf.read_port();
        self.join_counter = buf.read_u32();
        self.player_name = buf.read_cstring()?;
        self.internal_addr.deserialize_content(buf)
    }
}

/// Join refusal from the host [0x05].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectJoin {
    pub reason: RejectReason,
}

impl RejectJoin {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_REJECT_JOIN);
        buf.write_u32(self.reason);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 8)?;
        if size != 8 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.reason = buf.read_u32();
        Ok(())
    }
}

/// Slot table plus the joiner's own id and external address [0x04].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotInfoJoin {
    pub slot_info: SlotInfo,
    pub player_id: u8,
    pub external_addr: SockAddr,
}

impl SlotInfoJoin {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_SLOT_INFO_JOIN);
        self.slot_info.serialize_content(buf);
        buf.write_u8(self.player_id);
        self.external_addr.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 30)?;
        self.slot_info.deserialize_content(buf)?;
        if buf.size() < 17 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.player_id = buf.read_u8();
        self.external_addr.deserialize_content(buf)
    }
}

/// Announces another player to the lobby [0x06].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    pub join_counter: u32,
    pub player_id: u8,
    pub player_name: String,
    pub external_addr: SockAddr,
    pub internal_addr: SockAddr,
}

impl PlayerInfo {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_PLAYER_INFO);
        buf.write_u32(self.join_counter);
        buf.write_u8(self.player_id);
        buf.write_cstring(&self.player_name);
        buf.write_u16(1);
        self.external_addr.serialize_content(buf);
        self.internal_addr.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 44)?;
        self.join_counter = buf.read_u32();
        self.player_id = buf.read_u8();
        self.player_name = buf.read_cstring()?;
        if buf.size() < 34 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(2);
        self.external_addr.deserialize_content(buf)?;
        self.internal_addr.deserialize_content(buf)
    }
}

/// A player left the game [0x07].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerLeft {
    pub player_id: u8,
    pub reason: LeaveReason,
}

impl PlayerLeft {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_PLAYER_LEFT);
        buf.write_u8(self.player_id);
        buf.write_u32(self.reason);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 9)?;
        if size != 9 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.player_id = buf.read_u8();
        self.reason = buf.read_u32();
        Ok(())
    }
}

/// A player finished loading the map [0x08].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerLoaded {
    pub player_id: u8,
}

impl PlayerLoaded {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_PLAYER_LOADED);
        buf.write_u8(self.player_id);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 5)?;
        if size != 5 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.player_id = buf.read_u8();
        Ok(())
    }
}

impl SlotInfo {
    /// Framed slot table broadcast [0x09].
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_SLOT_INFO);
        self.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 13)?;
        self.deserialize_content(buf)
    }
}

/// Lobby countdown started [0x0A].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountDownStart;

impl CountDownStart {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_COUNT_DOWN_START);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 4)?;
        if size != 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        Ok(())
    }
}

/// Lobby countdown finished, game is starting [0x0B].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountDownEnd;

impl CountDownEnd {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_COUNT_DOWN_END);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 4)?;
        if size != 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        Ok(())
    }
}

impl TimeSlot {
    /// Framed simulation tick [0x0C], or [0x48] for a fragment that will be
    /// continued in the next frame.
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let pid = if self.fragment {
            PID_INCOMING_ACTION2
        } else {
            PID_INCOMING_ACTION
        };
        let (start, len_at) = begin_frame(buf, pid);
        self.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (pid, _) = read_frame_header(buf, 8)?;
        self.deserialize_content(buf)?;
        self.fragment = pid == PID_INCOMING_ACTION2;
        Ok(())
    }
}

impl Desync {
    /// Framed desync notification [0x0D].
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_DESYNC);
        self.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 14)?;
        self.deserialize_content(buf)
    }
}

impl Message {
    /// Framed chat message towards the host [0x28].
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_CHAT_TO_HOST);
        self.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 8)?;
        self.deserialize_content(buf)
    }
}

/// Chat message relayed by the host [0x0F].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRelay {
    pub message: Message,
}

impl MessageRelay {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_CHAT_FROM_HOST);
        self.message.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 8)?;
        self.message.deserialize_content(buf)
    }
}

/// Acknowledges a leave request [0x1B].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveAck;

impl LeaveAck {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_LEAVE_ACK);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 4)?;
        if size != 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        Ok(())
    }
}

/// A player announces they are leaving [0x21].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Leave {
    pub reason: LeaveReason,
}

impl Leave {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_LEAVE_REQ);
        buf.write_u32(self.reason);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 8)?;
        if size != 8 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.reason = buf.read_u32();
        Ok(())
    }
}

/// The local client finished loading [0x23].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameLoaded;

impl GameLoaded {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_GAME_LOADED_SELF);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 4)?;
        if size != 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        Ok(())
    }
}

/// Host asks the client to verify its local map file [0x3D].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapCheck {
    pub file_path: String,
    pub file_size: u32,
    pub file_crc: u32,
    pub map_xoro: u32,
    pub map_sha1: [u8; 20],
}

impl MapCheck {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_MAP_CHECK);
        buf.write_u32(1);
        buf.write_cstring(&self.file_path);
        buf.write_u32(self.file_size);
        buf.write_u32(self.file_crc);
        buf.write_u32(self.map_xoro);
        buf.write_blob(&self.map_sha1);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 41)?;
        if buf.read_u32() != 1 {
            return Err(W3Error::UnexpectedConst);
        }
        self.file_path = buf.read_cstring()?;
        if buf.size() < 32 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.file_size = buf.read_u32();
        self.file_crc = buf.read_u32();
        self.map_xoro = buf.read_u32();
        let sha = buf.read_blob(20);
        self.map_sha1.copy_from_slice(&sha);
        Ok(())
    }
}

/// Client reports the state of its local map file [0x42].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapState {
    pub ready: bool,
    pub file_size: u32,
}

impl MapState {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_MAP_SIZE);
        buf.write_u32(1);
        buf.write_bool(self.ready);
        buf.write_u32(self.file_size);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 13)?;
        if size != 13 {
            return Err(W3Error::InvalidPacketSize);
        }
        if buf.read_u32() != 1 {
            return Err(W3Error::UnexpectedConst);
        }
        self.ready = buf.read_bool();
        self.file_size = buf.read_u32();
        Ok(())
    }
}

/// Closed sum over the game-session catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Unknown(UnknownPacket),
    Ping(Ping),
    Pong(Pong),
    Join(Join),
    RejectJoin(RejectJoin),
    SlotInfoJoin(SlotInfoJoin),
    PlayerInfo(PlayerInfo),
    PlayerLeft(PlayerLeft),
    PlayerLoaded(PlayerLoaded),
    SlotInfo(SlotInfo),
    CountDownStart(CountDownStart),
    CountDownEnd(CountDownEnd),
    TimeSlot(TimeSlot),
    Desync(Desync),
    Message(Message),
    MessageRelay(MessageRelay),
    Leave(Leave),
    LeaveAck(LeaveAck),
    GameLoaded(GameLoaded),
    MapCheck(MapCheck),
    MapState(MapState),
}

impl Packet {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        match self {
            Packet::Unknown(p) => p.serialize(buf),
            Packet::Ping(p) => p.serialize(buf),
            Packet::Pong(p) => p.serialize(buf),
            Packet::Join(p) => p.serialize(buf),
            Packet::RejectJoin(p) => p.serialize(buf),
            Packet::SlotInfoJoin(p) => p.serialize(buf),
            Packet::PlayerInfo(p) => p.serialize(buf),
            Packet::PlayerLeft(p) => p.serialize(buf),
            Packet::PlayerLoaded(p) => p.serialize(buf),
            Packet::SlotInfo(p) => p.serialize(buf),
            Packet::CountDownStart(p) => p.serialize(buf),
            Packet::CountDownEnd(p) => p.serialize(buf),
            Packet::TimeSlot(p) => p.serialize(buf),
            Packet::Desync(p) => p.serialize(buf),
            Packet::Message(p) => p.serialize(buf),
            Packet::MessageRelay(p) => p.serialize(buf),
            Packet::Leave(p) => p.serialize(buf),
            Packet::LeaveAck(p) => p.serialize(buf),
            Packet::GameLoaded(p) => p.serialize(buf),
            Packet::MapCheck(p) => p.serialize(buf),
            Packet::MapState(p) => p.serialize(buf),
        }
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        match self {
            Packet::Unknown(p) => p.deserialize(buf),
            Packet::Ping(p) => p.deserialize(buf),
            Packet::Pong(p) => p.deserialize(buf),
            Packet::Join(p) => p.deserialize(buf),
            Packet::RejectJoin(p) => p.deserialize(buf),
            Packet::SlotInfoJoin(p) => p.deserialize(buf),
            Packet::PlayerInfo(p) => p.deserialize(buf),
            Packet::PlayerLeft(p) => p.deserialize(buf),
            Packet::PlayerLoaded(p) => p.deserialize(buf),
            Packet::SlotInfo(p) => p.deserialize(buf),
            Packet::CountDownStart(p) => p.deserialize(buf),
            Packet::CountDownEnd(p) => p.deserialize(buf),
            Packet::TimeSlot(p) => p.deserialize(buf),
            Packet::Desync(p) => p.deserialize(buf),
            Packet::Message(p) => p.deserialize(buf),
            Packet::MessageRelay(p) => p.deserialize(buf),
            Packet::Leave(p) => p.deserialize(buf),
            Packet::LeaveAck(p) => p.deserialize(buf),
            Packet::GameLoaded(p) => p.deserialize(buf),
            Packet::MapCheck(p) => p.deserialize(buf),
            Packet::MapState(p) => p.deserialize(buf),
        }
    }
}
