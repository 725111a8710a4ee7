//! # BNCS chat-service protocol
//!
//! The lobby and authentication protocol. Every message is
//! `{0xFF, id:u8, length:u16le, body}` with `length` counting the 4-byte
//! header; the length is written as a placeholder and back-patched once the
//! body is complete.
//!
//! Client-to-server and server-to-client traffic share the header and
//! several ids, so dispatch is direction-specific:
//! [`deserialize_client_packet`] interprets traffic arriving from a client,
//! [`deserialize_server_packet`] traffic arriving from a server. Ids that
//! neither direction knows fall back to a verbatim [`UnknownPacket`]
//! capture.

mod packets;

pub use packets::*;

use w3net_core::{Encoding, PacketFactory, Result, W3Error};

use crate::PacketBuffer;

/// Leading byte of every framed chat-service message.
pub const PROTOCOL_SIG: u8 = 0xFF;

pub const PID_KEEP_ALIVE: u8 = 0x00;
pub const PID_STOP_ADV: u8 = 0x02;
pub const PID_ENTER_CHAT: u8 = 0x0A;
pub const PID_JOIN_CHANNEL: u8 = 0x0C;
pub const PID_CHAT_COMMAND: u8 = 0x0E;
pub const PID_CHAT_EVENT: u8 = 0x0F;
pub const PID_FLOOD_DETECTED: u8 = 0x13;
pub const PID_MESSAGE_BOX: u8 = 0x19;
pub const PID_START_ADVEX3: u8 = 0x1C;
pub const PID_NOTIFY_JOIN: u8 = 0x22;
pub const PID_PING: u8 = 0x25;
pub const PID_NET_GAME_PORT: u8 = 0x45;
pub const PID_AUTH_INFO: u8 = 0x50;
pub const PID_AUTH_CHECK: u8 = 0x51;
pub const PID_AUTH_ACCOUNT_LOGON: u8 = 0x53;
pub const PID_AUTH_ACCOUNT_LOGON_PROOF: u8 = 0x54;

pub(crate) fn begin_frame(buf: &mut PacketBuffer, pid: u8) -> (usize, usize) {
    let start = buf.size();
    buf.write_u8(PROTOCOL_SIG);
    buf.write_u8(pid);
    let len_at = buf.reserve_u16();
    (start, len_at)
}

pub(crate) fn end_frame(buf: &mut PacketBuffer, start: usize, len_at: usize) -> usize {
    let n = buf.size() - start;
    buf.patch_u16(len_at, n as u16);
    n
}

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

/// Maps ids to fresh values for traffic arriving from a client.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientFactory;

impl PacketFactory<Packet> for ClientFactory {
    fn new_instance(&self, tag: u8, _enc: &Encoding) -> Option<Packet> {
        Some(match tag {
            PID_KEEP_ALIVE => Packet::KeepAlive(KeepAlive),
            PID_STOP_ADV => Packet::StopAdv(StopAdv),
            PID_ENTER_CHAT => Packet::EnterChatReq(EnterChatReq::default()),
            PID_JOIN_CHANNEL => Packet::JoinChannel(JoinChannel::default()),
            PID_CHAT_COMMAND => Packet::ChatCommand(ChatCommand::default()),
            PID_START_ADVEX3 => Packet::StartAdvex3Req(StartAdvex3Req::default()),
            PID_NOTIFY_JOIN => Packet::NotifyJoin(NotifyJoin::default()),
            PID_PING => Packet::Ping(Ping::default()),
            PID_NET_GAME_PORT => Packet::NetGamePort(NetGamePort::default()),
            PID_AUTH_INFO => Packet::AuthInfoReq(AuthInfoReq::default()),
            PID_AUTH_CHECK => Packet::AuthCheckReq(AuthCheckReq::default()),
            PID_AUTH_ACCOUNT_LOGON => Packet::AuthAccountLogonReq(AuthAccountLogonReq::default()),
            PID_AUTH_ACCOUNT_LOGON_PROOF => {
                Packet::AuthAccountLogonProofReq(AuthAccountLogonProofReq::default())
            }
            _ => return None,
        })
    }
}

/// Maps ids to fresh values for traffic arriving from a server.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFactory;

impl PacketFactory<Packet> for ServerFactory {
    fn new_instance(&self, tag: u8, _enc: &Encoding) -> Option<Packet> {
        Some(match tag {
            PID_KEEP_ALIVE => Packet::KeepAlive(KeepAlive),
            PID_ENTER_CHAT => Packet::EnterChatResp(EnterChatResp::default()),
            PID_CHAT_EVENT => Packet::ChatEvent(ChatEvent::default()),
            PID_FLOOD_DETECTED => Packet::FloodDetected(FloodDetected),
            PID_MESSAGE_BOX => Packet::MessageBox(MessageBox::default()),
            PID_START_ADVEX3 => Packet::StartAdvex3Resp(StartAdvex3Resp::default()),
            PID_PING => Packet::Ping(Ping::default()),
            PID_AUTH_INFO => Packet::AuthInfoResp(AuthInfoResp::default()),
            PID_AUTH_CHECK => Packet::AuthCheckResp(AuthCheckResp::default()),
            PID_AUTH_ACCOUNT_LOGON => Packet::AuthAccountLogonResp(AuthAccountLogonResp::default()),
            PID_AUTH_ACCOUNT_LOGON_PROOF => {
                Packet::AuthAccountLogonProofResp(AuthAccountLogonProofResp::default())
            }
            _ => return None,
        })
    }
}

/// Serializes one framed packet and returns the bytes written.
pub fn serialize_packet(buf: &mut PacketBuffer, pkt: &Packet) -> Result<usize> {
    pkt.serialize(buf)
}

/// Interprets an incoming client frame (server side).
pub fn deserialize_client_packet(buf: &mut PacketBuffer) -> Result<(Packet, usize)> {
    deserialize_packet_with(buf, &ClientFactory)
}

/// Interprets an incoming server frame (client side).
pub fn deserialize_server_packet(buf: &mut PacketBuffer) -> Result<(Packet, usize)> {
    deserialize_packet_with(buf, &ServerFactory)
}

fn deserialize_packet_with<F>(buf: &mut PacketBuffer, factory: &F) -> Result<(Packet, usize)>
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
        .new_instance(pid, &Encoding::default())
        .unwrap_or_else(|| Packet::Unknown(UnknownPacket::default()));
    pkt.deserialize(buf)?;

    if before - buf.size() != size {
        return Err(W3Error::InvalidPacketSize);
    }
    Ok((pkt, size))
}
