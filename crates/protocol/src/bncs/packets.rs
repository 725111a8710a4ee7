//! Framed chat-service packets
//!
//! One struct per catalog entry, each owning the full frame: serialization
//! writes `{0xFF, id, length placeholder}`, the body, then back-patches the
//! length; deserialization validates the signature and declared length
//! before touching the body. Requests and responses that share an id are
//! separate types; the direction-specific factories in [`super`] pick
//! between them.

use w3net_core::{Result, W3Error};

use crate::w3gs::{GameFlags, GameSettings, GameVersion};
use crate::{DString, PacketBuffer};

use super::{
    begin_frame, end_frame, read_frame_header, PID_AUTH_ACCOUNT_LOGON,
    PID_AUTH_ACCOUNT_LOGON_PROOF, PID_AUTH_CHECK, PID_AUTH_INFO, PID_CHAT_COMMAND, PID_CHAT_EVENT,
    PID_ENTER_CHAT, PID_FLOOD_DETECTED, PID_JOIN_CHANNEL, PID_KEEP_ALIVE, PID_MESSAGE_BOX,
    PID_NET_GAME_PORT, PID_NOTIFY_JOIN, PID_PING, PID_START_ADVEX3, PID_STOP_ADV,
};

/// Join-channel flags.
pub const CHANNEL_JOIN: u32 = 0x00;
pub const CHANNEL_JOIN_FIRST: u32 = 0x01;
pub const CHANNEL_JOIN_FORCED: u32 = 0x02;

/// Chat event ids.
pub const EVENT_SHOW_USER: u32 = 0x01;
pub const EVENT_JOIN: u32 = 0x02;
pub const EVENT_LEAVE: u32 = 0x03;
pub const EVENT_WHISPER: u32 = 0x04;
pub const EVENT_TALK: u32 = 0x05;
pub const EVENT_BROADCAST: u32 = 0x06;
pub const EVENT_CHANNEL: u32 = 0x07;
pub const EVENT_CHANNEL_FULL: u32 = 0x0D;
pub const EVENT_CHANNEL_RESTRICTED: u32 = 0x0F;

/// Account logon proof status codes.
pub const LOGON_PROOF_SUCCESS: u32 = 0x00;
pub const LOGON_PROOF_BAD_PASSWORD: u32 = 0x02;
pub const LOGON_PROOF_ACCOUNT_CLOSED: u32 = 0x06;
pub const LOGON_PROOF_EMAIL_REQUIRED: u32 = 0x0E;
pub const LOGON_PROOF_CUSTOM_ERROR: u32 = 0x0F;

/// Unrecognized frame, preserved verbatim including its 4-byte header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownPacket {
    pub id: u8,
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
        self.id = self.blob[1];
        Ok(())
    }
}

/// Empty keep-alive [0x00].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepAlive;

impl KeepAlive {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_KEEP_ALIVE);
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

/// Echo probe [0x25]. The peer answers with the same payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ping {
    pub payload: u32,
}

impl Ping {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_PING);
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

/// Client requests to enter chat [0x0A].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnterChatReq {
    pub username: String,
    pub stat_string: String,
}

impl EnterChatReq {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_ENTER_CHAT);
        buf.write_cstring(&self.username);
        buf.write_cstring(&self.stat_string);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 6)?;
        self.username = buf.read_cstring()?;
        self.stat_string = buf.read_cstring()?;
        Ok(())
    }
}

/// Server confirms chat entry [0x0A].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnterChatResp {
    pub unique_name: String,
    pub stat_string: String,
    pub account_name: String,
}

impl EnterChatResp {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_ENTER_CHAT);
        buf.write_cstring(&self.unique_name);
        buf.write_cstring(&self.stat_string);
        buf.write_cstring(&self.account_name);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 7)?;
        self.unique_name = buf.read_cstring()?;
        self.stat_string = buf.read_cstring()?;
        self.account_name = buf.read_cstring()?;
        Ok(())
    }
}

/// Client joins a chat channel [0x0C].
///
/// # Packet Format
/// ```text
/// {0xFF}{0x0C}{u16 length}{u32 flags}{channel\0}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinChannel {
    pub flags: u32,
    pub channel: String,
}

impl JoinChannel {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_JOIN_CHANNEL);
        buf.write_u32(self.flags);
        buf.write_cstring(&self.channel);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 9)?;
        self.flags = buf.read_u32();
        self.channel = buf.read_cstring()?;
        Ok(())
    }
}

/// Chat text or slash command from the client [0x0E].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatCommand {
    pub text: String,
}

impl ChatCommand {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_CHAT_COMMAND);
        buf.write_cstring(&self.text);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 5)?;
        self.text = buf.read_cstring()?;
        Ok(())
    }
}

/// Chat activity relayed by the server [0x0F].
///
/// # Packet Format
/// ```text
/// {0xFF}{0x0F}{u16 length}
/// {u32 event id}{u32 user flags}{u32 ping}
/// {u32 defunct}{u32 defunct}{u32 defunct}
/// {username\0}{text\0}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatEvent {
    pub event_id: u32,
    pub user_flags: u32,
    pub ping: u32,
    pub user_name: String,
    pub text: String,
}

impl ChatEvent {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_CHAT_EVENT);
        buf.write_u32(self.event_id);
        buf.write_u32(self.user_flags);
        buf.write_u32(self.ping);
        buf.write_u32(0);
        buf.write_u32(0);
        buf.write_u32(0);
        buf.write_cstring(&self.user_name);
        buf.write_cstring(&self.text);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 30)?;
        self.event_id = buf.read_u32();
        self.user_flags = buf.read_u32();
        self.ping = buf.read_u32();
        buf.skip(12);
        self.user_name = buf.read_cstring()?;
        self.text = buf.read_cstring()?;
        Ok(())
    }
}

/// Server detected chat flooding; the connection is about to drop [0x13].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloodDetected;

impl FloodDetected {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_FLOOD_DETECTED);
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

/// Server asks the client to display a message box [0x19].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBox {
    pub style: u32,
    pub text: String,
    pub caption: String,
}

impl MessageBox {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_MESSAGE_BOX);
        buf.write_u32(self.style);
        buf.write_cstring(&self.text);
        buf.write_cstring(&self.caption);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 10)?;
        self.style = buf.read_u32();
        self.text = buf.read_cstring()?;
        self.caption = buf.read_cstring()?;
        Ok(())
    }
}

/// Client advertises a hosted game [0x1C].
///
/// # Packet Format
/// ```text
/// {0xFF}{0x1C}{u16 length}
/// {u32 game state}{u32 uptime sec}{u32 game flags}{u32 ladder type}
/// {game name\0}
/// {8 hex chars: host counter, reversed}{encoded game settings\0}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartAdvex3Req {
    pub game_state: u32,
    pub uptime_sec: u32,
    pub game_flags: GameFlags,
    pub ladder_type: u32,
    pub game_name: String,
    pub host_counter: u32,
    pub game_settings: GameSettings,
}

impl StartAdvex3Req {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_START_ADVEX3);
        buf.write_u32(self.game_state);
        buf.write_u32(self.uptime_sec);
        buf.write_u32(self.game_flags);
        buf.write_u32(self.ladder_type);
        buf.write_cstring(&self.game_name);

        let counter: String = format!("{:08x}", self.host_counter).chars().rev().collect();
        buf.write_blob(counter.as_bytes());
        self.game_settings.serialize_content(buf);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 29)?;
        self.game_state = buf.read_u32();
        self.uptime_sec = buf.read_u32();
        self.game_flags = buf.read_u32();
        self.ladder_type = buf.read_u32();
        self.game_name = buf.read_cstring()?;

        if buf.size() < 9 {
            return Err(W3Error::InvalidPacketSize);
        }
        let counter = buf.read_blob(8);
        let counter = std::str::from_utf8(&counter).map_err(|_| W3Error::BadFormat)?;
        let counter: String = counter.chars().rev().collect();
        self.host_counter = u32::from_str_radix(&counter, 16).map_err(|_| W3Error::BadFormat)?;

        self.game_settings.deserialize_content(buf)
    }
}

/// Server acknowledges a game advertisement [0x1C].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartAdvex3Resp {
    pub failed: bool,
}

impl StartAdvex3Resp {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_START_ADVEX3);
        buf.write_bool32(self.failed);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 8)?;
        if size != 8 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.failed = buf.read_bool32();
        Ok(())
    }
}

/// Client stops advertising its game [0x02].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopAdv;

impl StopAdv {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_STOP_ADV);
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

/// Client notifies the service it is joining a game [0x22].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyJoin {
    pub game_version: GameVersion,
    pub game_name: String,
    pub game_password: String,
}

impl NotifyJoin {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_NOTIFY_JOIN);
        self.game_version.serialize_content(buf);
        buf.write_cstring(&self.game_name);
        buf.write_cstring(&self.game_password);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 14)?;
        self.game_version.deserialize_content(buf)?;
        self.game_name = buf.read_cstring()?;
        self.game_password = buf.read_cstring()?;
        Ok(())
    }
}

/// Client announces the local port its game host listens on [0x45].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetGamePort {
    pub port: u16,
}

impl NetGamePort {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_NET_GAME_PORT);
        buf.write_port(self.port);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 6)?;
        if size != 6 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.port = buf.read_port();
        Ok(())
    }
}

/// Opening authentication handshake from the client [0x50].
///
/// # Packet Format
/// ```text
/// {0xFF}{0x50}{u16 length}
/// {u32 protocol id (0)}
/// {4 byte platform code}{4 byte product code}{u32 version}
/// {4 byte language code}{4 byte local ip}
/// {u32 time zone bias}{u32 locale id}{u32 user language id}
/// {country abbreviation\0}{country\0}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthInfoReq {
    pub platform_code: DString,
    pub game_version: GameVersion,
    pub language_code: DString,
    pub local_ip: Option<std::net::IpAddr>,
    pub time_zone_bias: u32,
    pub mpq_locale_id: u32,
    pub user_language_id: u32,
    pub country_abbreviation: String,
    pub country: String,
}

impl AuthInfoReq {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_INFO);
        buf.write_u32(0);
        buf.write_dstring(self.platform_code);
        self.game_version.serialize_content(buf);
        buf.write_dstring(self.language_code);
        let _ = buf.write_ip(self.local_ip);
        buf.write_u32(self.time_zone_bias);
        buf.write_u32(self.mpq_locale_id);
        buf.write_u32(self.user_language_id);
        buf.write_cstring(&self.country_abbreviation);
        buf.write_cstring(&self.country);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 42)?;
        if buf.read_u32() != 0 {
            return Err(W3Error::UnexpectedConst);
        }
        self.platform_code = buf.read_dstring();
        self.game_version.deserialize_content(buf)?;
        self.language_code = buf.read_dstring();
        self.local_ip = buf.read_ip();
        self.time_zone_bias = buf.read_u32();
        self.mpq_locale_id = buf.read_u32();
        self.user_language_id = buf.read_u32();
        self.country_abbreviation = buf.read_cstring()?;
        self.country = buf.read_cstring()?;
        Ok(())
    }
}

/// Server's answer to the opening handshake [0x50].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthInfoResp {
    pub logon_type: u32,
    pub server_token: u32,
    pub udp_value: u32,
    pub mpq_file_time: u64,
    pub mpq_file_name: String,
    pub value_string: String,
}

impl AuthInfoResp {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_INFO);
        buf.write_u32(self.logon_type);
        buf.write_u32(self.server_token);
        buf.write_u32(self.udp_value);
        buf.write_u32(self.mpq_file_time as u32);
        buf.write_u32((self.mpq_file_time >> 32) as u32);
        buf.write_cstring(&self.mpq_file_name);
        buf.write_cstring(&self.value_string);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 26)?;
        self.logon_type = buf.read_u32();
        self.server_token = buf.read_u32();
        self.udp_value = buf.read_u32();
        let low = buf.read_u32() as u64;
        let high = buf.read_u32() as u64;
        self.mpq_file_time = high << 32 | low;
        self.mpq_file_name = buf.read_cstring()?;
        self.value_string = buf.read_cstring()?;
        Ok(())
    }
}

/// One CD key block inside [`AuthCheckReq`].
///
/// # Packet Format
/// ```text
/// {u32 key length}{u32 key product value}{u32 key public value}
/// {u32 zero}{20 byte hash}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CDKey {
    pub key_length: u32,
    pub key_product_value: u32,
    pub key_public_value: u32,
    pub hash: [u8; 20],
}

impl CDKey {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        buf.write_u32(self.key_length);
        buf.write_u32(self.key_product_value);
        buf.write_u32(self.key_public_value);
        buf.write_u32(0);
        buf.write_blob(&self.hash);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 36 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.key_length = buf.read_u32();
        self.key_product_value = buf.read_u32();
        self.key_public_value = buf.read_u32();
        buf.skip(4);
        let hash = buf.read_blob(20);
        self.hash.copy_from_slice(&hash);
        Ok(())
    }
}

/// Client proves its installation [0x51].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCheckReq {
    pub client_token: u32,
    pub exe_version: u32,
    pub exe_hash: u32,
    pub cd_keys: Vec<CDKey>,
    pub exe_information: String,
    pub key_owner_name: String,
}

impl AuthCheckReq {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_CHECK);
        buf.write_u32(self.client_token);
        buf.write_u32(self.exe_version);
        buf.write_u32(self.exe_hash);
        buf.write_u32(self.cd_keys.len() as u32);
        for key in &self.cd_keys {
            key.serialize_content(buf);
        }
        buf.write_cstring(&self.exe_information);
        buf.write_cstring(&self.key_owner_name);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 22)?;
        self.client_token = buf.read_u32();
        self.exe_version = buf.read_u32();
        self.exe_hash = buf.read_u32();

        let count = buf.read_u32() as usize;
        self.cd_keys.clear();
        for _ in 0..count {
            let mut key = CDKey::default();
            key.deserialize_content(buf)?;
            self.cd_keys.push(key);
        }

        self.exe_information = buf.read_cstring()?;
        self.key_owner_name = buf.read_cstring()?;
        Ok(())
    }
}

/// Server's verdict on the installation proof [0x51].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCheckResp {
    pub result: u32,
    pub additional_information: String,
}

impl AuthCheckResp {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_CHECK);
        buf.write_u32(self.result);
        buf.write_cstring(&self.additional_information);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 9)?;
        self.result = buf.read_u32();
        self.additional_information = buf.read_cstring()?;
        Ok(())
    }
}

/// Client opens the SRP account logon [0x53].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccountLogonReq {
    pub client_key: [u8; 32],
    pub username: String,
}

impl Default for AuthAccountLogonReq {
    fn default() -> Self {
        Self {
            client_key: [0; 32],
            username: String::new(),
        }
    }
}

impl AuthAccountLogonReq {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_ACCOUNT_LOGON);
        buf.write_blob(&self.client_key);
        buf.write_cstring(&self.username);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 37)?;
        let key = buf.read_blob(32);
        self.client_key.copy_from_slice(&key);
        self.username = buf.read_cstring()?;
        Ok(())
    }
}

/// Server continues the SRP exchange [0x53].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccountLogonResp {
    pub status: u32,
    pub salt: [u8; 32],
    pub server_key: [u8; 32],
}

impl Default for AuthAccountLogonResp {
    fn default() -> Self {
        Self {
            status: 0,
            salt: [0; 32],
            server_key: [0; 32],
        }
    }
}

impl AuthAccountLogonResp {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_ACCOUNT_LOGON);
        buf.write_u32(self.status);
        buf.write_blob(&self.salt);
        buf.write_blob(&self.server_key);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 72)?;
        if size != 72 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.status = buf.read_u32();
        let salt = buf.read_blob(32);
        self.salt.copy_from_slice(&salt);
        let key = buf.read_blob(32);
        self.server_key.copy_from_slice(&key);
        Ok(())
    }
}

/// Client sends its password proof (SRP M1) [0x54].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthAccountLogonProofReq {
    pub client_password_proof: [u8; 20],
}

impl AuthAccountLogonProofReq {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_ACCOUNT_LOGON_PROOF);
        buf.write_blob(&self.client_password_proof);
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let (_, size) = read_frame_header(buf, 24)?;
        if size != 24 {
            return Err(W3Error::InvalidPacketSize);
        }
        let proof = buf.read_blob(20);
        self.client_password_proof.copy_from_slice(&proof);
        Ok(())
    }
}

/// Server's verdict on the password proof [0x54].
///
/// The trailing message is only on the wire for the statuses that define
/// one (email registration prompt, custom error text).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthAccountLogonProofResp {
    pub status: u32,
    pub server_password_proof: [u8; 20],
    pub additional_information: String,
}

impl AuthAccountLogonProofResp {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        let (start, len_at) = begin_frame(buf, PID_AUTH_ACCOUNT_LOGON_PROOF);
        buf.write_u32(self.status);
        buf.write_blob(&self.server_password_proof);
        if matches!(self.status, LOGON_PROOF_EMAIL_REQUIRED | LOGON_PROOF_CUSTOM_ERROR) {
            buf.write_cstring(&self.additional_information);
        }
        Ok(end_frame(buf, start, len_at))
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        read_frame_header(buf, 28)?;
        self.status = buf.read_u32();
        let proof = buf.read_blob(20);
        self.server_password_proof.copy_from_slice(&proof);
        self.additional_information =
            if matches!(self.status, LOGON_PROOF_EMAIL_REQUIRED | LOGON_PROOF_CUSTOM_ERROR) {
                buf.read_cstring()?
            } else {
                String::new()
            };
        Ok(())
    }
}

/// Closed sum over both directions of the chat-service catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Unknown(UnknownPacket),
    KeepAlive(KeepAlive),
    Ping(Ping),
    EnterChatReq(EnterChatReq),
    EnterChatResp(EnterChatResp),
    JoinChannel(JoinChannel),
    ChatCommand(ChatCommand),
    ChatEvent(ChatEvent),
    FloodDetected(FloodDetected),
    MessageBox(MessageBox),
    StartAdvex3Req(StartAdvex3Req),
    StartAdvex3Resp(StartAdvex3Resp),
    StopAdv(StopAdv),
    NotifyJoin(NotifyJoin),
    NetGamePort(NetGamePort),
    AuthInfoReq(AuthInfoReq),
    AuthInfoResp(AuthInfoResp),
    AuthCheckReq(AuthCheckReq),
    AuthCheckResp(AuthCheckResp),
    AuthAccountLogonReq(AuthAccountLogonReq),
    AuthAccountLogonResp(AuthAccountLogonResp),
    AuthAccountLogonProofReq(AuthAccountLogonProofReq),
    AuthAccountLogonProofResp(AuthAccountLogonProofResp),
}

impl Packet {
    pub fn serialize(&self, buf: &mut PacketBuffer) -> Result<usize> {
        match self {
            Packet::Unknown(p) => p.serialize(buf),
            Packet::KeepAlive(p) => p.serialize(buf),
            Packet::Ping(p) => p.serialize(buf),
            Packet::EnterChatReq(p) => p.serialize(buf),
            Packet::EnterChatResp(p) => p.serialize(buf),
            Packet::JoinChannel(p) => p.serialize(buf),
            Packet::ChatCommand(p) => p.serialize(buf),
            Packet::ChatEvent(p) => p.serialize(buf),
            Packet::FloodDetected(p) => p.serialize(buf),
            Packet::MessageBox(p) => p.serialize(buf),
            Packet::StartAdvex3Req(p) => p.serialize(buf),
            Packet::StartAdvex3Resp(p) => p.serialize(buf),
            Packet::StopAdv(p) => p.serialize(buf),
            Packet::NotifyJoin(p) => p.serialize(buf),
            Packet::NetGamePort(p) => p.serialize(buf),
            Packet::AuthInfoReq(p) => p.serialize(buf),
            Packet::AuthInfoResp(p) => p.serialize(buf),
            Packet::AuthCheckReq(p) => p.serialize(buf),
            Packet::AuthCheckResp(p) => p.serialize(buf),
            Packet::AuthAccountLogonReq(p) => p.serialize(buf),
            Packet::AuthAccountLogonResp(p) => p.serialize(buf),
            Packet::AuthAccountLogonProofReq(p) => p.serialize(buf),
            Packet::AuthAccountLogonProofResp(p) => p.serialize(buf),
        }
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        match self {
            Packet::Unknown(p) => p.deserialize(buf),
            Packet::KeepAlive(p) => p.deserialize(buf),
            Packet::Ping(p) => p.deserialize(buf),
            Packet::EnterChatReq(p) => p.deserialize(buf),
            Packet::EnterChatResp(p) => p.deserialize(buf),
            Packet::JoinChannel(p) => p.deserialize(buf),
            Packet::ChatCommand(p) => p.deserialize(buf),
            Packet::ChatEvent(p) => p.deserialize(buf),
            Packet::FloodDetected(p) => p.deserialize(buf),
            Packet::MessageBox(p) => p.deserialize(buf),
            Packet::StartAdvex3Req(p) => p.deserialize(buf),
            Packet::StartAdvex3Resp(p) => p.deserialize(buf),
            Packet::StopAdv(p) => p.deserialize(buf),
            Packet::NotifyJoin(p) => p.deserialize(buf),
            Packet::NetGamePort(p) => p.deserialize(buf),
            Packet::AuthInfoReq(p) => p.deserialize(buf),
            Packet::AuthInfoResp(p) => p.deserialize(buf),
            Packet::AuthCheckReq(p) => p.deserialize(buf),
            Packet::AuthCheckResp(p) => p.deserialize(buf),
            Packet::AuthAccountLogonReq(p) => p.deserialize(buf),
            Packet::AuthAccountLogonResp(p) => p.deserialize(buf),
            Packet::AuthAccountLogonProofReq(p) => p.deserialize(buf),
            Packet::AuthAccountLogonProofResp(p) => p.deserialize(buf),
        }
    }
}
