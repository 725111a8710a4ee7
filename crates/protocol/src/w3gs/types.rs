//! Shared game-session structures
//!
//! These types appear both inside framed W3GS packets and inside replay
//! records, so each owns a `serialize_content` / `deserialize_content`
//! pair that writes the body WITHOUT any tag or frame header. The wrapping
//! packet or record contributes only its own tag and length discipline and
//! delegates the rest here.

use serde::{Deserialize, Serialize};
use w3net_core::{Result, W3Error};

use crate::{DString, PacketBuffer};

/// Product identifiers (reversed in memory, natural on the wire).
pub const PRODUCT_DEMO: DString = DString::new(*b"MD3W");
pub const PRODUCT_ROC: DString = DString::new(*b"3RAW");
pub const PRODUCT_TFT: DString = DString::new(*b"PX3W");

/// Race preference flags.
pub type RacePref = u32;
pub const RACE_HUMAN: RacePref = 0x01;
pub const RACE_ORC: RacePref = 0x02;
pub const RACE_NIGHT_ELF: RacePref = 0x04;
pub const RACE_UNDEAD: RacePref = 0x08;
pub const RACE_DEMON: RacePref = 0x10;
pub const RACE_RANDOM: RacePref = 0x20;
pub const RACE_SELECTABLE: RacePref = 0x40;

/// Game flags advertised alongside a hosted game.
pub type GameFlags = u32;
pub const GAME_FLAG_CUSTOM_GAME: GameFlags = 0x0000_0001;
pub const GAME_FLAG_MELEE: GameFlags = 0x0000_0002;
pub const GAME_FLAG_SAVED_GAME: GameFlags = 0x0000_0200;
pub const GAME_FLAG_PRIVATE_GAME: GameFlags = 0x0000_0800;

/// Map options carried in the encoded settings block.
pub type GameSettingFlags = u32;
pub const SETTING_SPEED_SLOW: GameSettingFlags = 0x0000_0000;
pub const SETTING_SPEED_NORMAL: GameSettingFlags = 0x0000_0001;
pub const SETTING_SPEED_FAST: GameSettingFlags = 0x0000_0002;
pub const SETTING_SPEED_MASK: GameSettingFlags = 0x0000_0003;
pub const SETTING_TERRAIN_HIDDEN: GameSettingFlags = 0x0000_0100;
pub const SETTING_TERRAIN_EXPLORED: GameSettingFlags = 0x0000_0200;
pub const SETTING_TERRAIN_VISIBLE: GameSettingFlags = 0x0000_0400;
pub const SETTING_TERRAIN_DEFAULT: GameSettingFlags = 0x0000_0800;
pub const SETTING_OBS_ON_DEFEAT: GameSettingFlags = 0x0000_2000;
pub const SETTING_OBS_FULL: GameSettingFlags = 0x0000_3000;
pub const SETTING_TEAMS_TOGETHER: GameSettingFlags = 0x0000_4000;
pub const SETTING_TEAMS_FIXED: GameSettingFlags = 0x0006_0000;
pub const SETTING_SHARED_CONTROL: GameSettingFlags = 0x0100_0000;
pub const SETTING_RANDOM_HERO: GameSettingFlags = 0x0200_0000;
pub const SETTING_RANDOM_RACE: GameSettingFlags = 0x0400_0000;
pub const SETTING_OBS_REFEREES: GameSettingFlags = 0x4000_0000;

/// Reason codes for a player leaving the game.
pub type LeaveReason = u32;
pub const LEAVE_DISCONNECT: LeaveReason = 0x01;
pub const LEAVE_LOST: LeaveReason = 0x07;
pub const LEAVE_LOST_BUILDINGS: LeaveReason = 0x08;
pub const LEAVE_WON: LeaveReason = 0x09;
pub const LEAVE_DRAW: LeaveReason = 0x0A;
pub const LEAVE_OBSERVER: LeaveReason = 0x0B;
pub const LEAVE_LOBBY: LeaveReason = 0x0D;

/// In-game message kinds.
pub type MessageType = u8;
pub const MSG_CHAT: MessageType = 0x10;
pub const MSG_TEAM_CHANGE: MessageType = 0x11;
pub const MSG_COLOR_CHANGE: MessageType = 0x12;
pub const MSG_RACE_CHANGE: MessageType = 0x13;
pub const MSG_HANDICAP_CHANGE: MessageType = 0x14;
pub const MSG_CHAT_EXTRA: MessageType = 0x20;

/// Chat destination for scope-carrying messages.
pub type MessageScope = u32;
pub const SCOPE_ALL: MessageScope = 0x00;
pub const SCOPE_ALLIES: MessageScope = 0x01;
pub const SCOPE_OBSERVERS: MessageScope = 0x02;
/// Messages to a specific player N use `SCOPE_PLAYER_0 + N`.
pub const SCOPE_PLAYER_0: MessageScope = 0x03;

/// Slot occupancy.
pub const SLOT_EMPTY: u8 = 0x00;
pub const SLOT_CLOSED: u8 = 0x01;
pub const SLOT_OCCUPIED: u8 = 0x02;

/// Computer strength.
pub const AI_EASY: u8 = 0x00;
pub const AI_NORMAL: u8 = 0x01;
pub const AI_INSANE: u8 = 0x02;

/// Slot layouts on the start screen.
pub const LAYOUT_MELEE: u8 = 0x00;
pub const LAYOUT_FIXED_TEAMS: u8 = 0x01;
pub const LAYOUT_FIXED_PLAYERS: u8 = 0x03;
pub const LAYOUT_FIXED_RACE_RANDOM: u8 = 0x04;
pub const LAYOUT_LADDER: u8 = 0xCC;

/// Join rejection codes.
pub type RejectReason = u32;
pub const REJECT_JOIN_INVALID: RejectReason = 0x07;
pub const REJECT_JOIN_FULL: RejectReason = 0x09;
pub const REJECT_JOIN_STARTED: RejectReason = 0x0A;
pub const REJECT_JOIN_WRONG_KEY: RejectReason = 0x1B;

/// Sub-types of the extra player data block.
pub const PLAYER_EXTRA_PROFILE: u8 = 0x03;
pub const PLAYER_EXTRA_SKINS: u8 = 0x04;

/// Product + patch level of a peer.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+----------------------------
///      4 byte  | product identifier
///      1 dword | patch level (e.g. 26, 30)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersion {
    pub product: DString,
    pub version: u32,
}

impl GameVersion {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        buf.write_dstring(self.product);
        buf.write_u32(self.version);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 8 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.product = buf.read_dstring();
        self.version = buf.read_u32();
        Ok(())
    }
}

/// Socket address in the 16-byte on-wire layout.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+----------------------------
///      1 word  | address family (2 when set)
///      1 word  | port (network byte order)
///      4 byte  | IPv4 address
///      8 byte  | zero padding
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SockAddr {
    pub port: u16,
    pub ip: Option<std::net::IpAddr>,
}

impl SockAddr {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        if self.ip.is_some() || self.port != 0 {
            buf.write_u16(2);
        } else {
            buf.write_u16(0);
        }
        buf.write_port(self.port);
        let _ = buf.write_ip(self.ip);
        buf.write_u32(0);
        buf.write_u32(0);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 16 {
            return Err(W3Error::InvalidPacketSize);
        }
        match buf.read_u16() {
            0 | 2 => {}
            _ => return Err(W3Error::UnexpectedConst),
        }
        self.port = buf.read_port();
        self.ip = buf.read_ip();
        buf.skip(8);
        Ok(())
    }
}

/// Host-side game configuration, transported as an "encoded string".
///
/// The decoded body is serialized first, then rewritten so that no byte is
/// even (and therefore never zero): each group of up to 7 data bytes is
/// prefixed with a control byte whose bit `i+1` records whether data byte
/// `i` was even before its low bit was forced on. The encoded form is
/// terminated by a zero byte, which makes it embeddable wherever a plain
/// zero-terminated string is expected.
///
/// # Decoded format
/// ```text
///    size/type | Description
///   -----------+----------------------------
///      1 dword | game setting flags
///      1 word  | map width
///      1 word  | map height
///      1 dword | map xoro checksum
///     variable | map path (zero terminated)
///     variable | host name (zero terminated)
///     20 byte  | map sha1 hash
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub game_setting_flags: GameSettingFlags,
    pub map_width: u16,
    pub map_height: u16,
    pub map_xoro: u32,
    pub map_path: String,
    pub host_name: String,
    pub map_sha1: [u8; 20],
}

impl GameSettings {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        let mut raw = PacketBuffer::with_capacity(64);
        raw.write_u32(self.game_setting_flags);
        raw.write_u16(self.map_width);
        raw.write_u16(self.map_height);
        raw.write_u32(self.map_xoro);
        raw.write_cstring(&self.map_path);
        raw.write_cstring(&self.host_name);
        raw.write_blob(&self.map_sha1);

        for chunk in raw.as_slice().chunks(7) {
            let mut mask = 1u8;
            for (i, &b) in chunk.iter().enumerate() {
                if b % 2 == 0 {
                    mask |= 1 << (i + 1);
                }
            }
            buf.write_u8(mask);
            for &b in chunk {
                buf.write_u8(b | 1);
            }
        }
        buf.write_u8(0);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        let encoded = buf.read_cstring_bytes()?;

        let mut decoded = PacketBuffer::with_capacity(encoded.len());
        for group in encoded.chunks(8) {
            let mask = group[0];
            for (i, &b) in group[1..].iter().enumerate() {
                if mask & (1 << (i + 1)) != 0 {
                    decoded.write_u8(b - 1);
                } else {
                    decoded.write_u8(b);
                }
            }
        }

        if decoded.size() < 12 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.game_setting_flags = decoded.read_u32();
        self.map_width = decoded.read_u16();
        self.map_height = decoded.read_u16();
        self.map_xoro = decoded.read_u32();
        self.map_path = decoded.read_cstring()?;
        self.host_name = decoded.read_cstring()?;

        self.map_sha1 = [0; 20];
        if decoded.size() >= 20 {
            let sha = decoded.read_blob(20);
            self.map_sha1.copy_from_slice(&sha);
        }

        Ok(())
    }
}

/// One slot on the start screen (9 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotData {
    pub player_id: u8,
    /// Map download percentage; `0x64` in custom games, `0xFF` on ladder.
    pub download_status: u8,
    pub slot_status: u8,
    pub computer: bool,
    /// Team 12 marks observers and referees.
    pub team: u8,
    pub color: u8,
    pub race: RacePref,
    pub computer_type: u8,
    /// Percentage; valid values 0x32..=0x64 in steps of ten.
    pub handicap: u8,
}

impl SlotData {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        buf.write_u8(self.player_id);
        buf.write_u8(self.download_status);
        buf.write_u8(self.slot_status);
        buf.write_bool(self.computer);
        buf.write_u8(self.team);
        buf.write_u8(self.color);
        buf.write_u8(self.race as u8);
        buf.write_u8(self.computer_type);
        buf.write_u8(self.handicap);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 9 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.player_id = buf.read_u8();
        self.download_status = buf.read_u8();
        self.slot_status = buf.read_u8();
        self.computer = buf.read_bool();
        self.team = buf.read_u8();
        self.color = buf.read_u8();
        self.race = buf.read_u8() as RacePref;
        self.computer_type = buf.read_u8();
        self.handicap = buf.read_u8();
        Ok(())
    }
}

/// Start-screen slot table.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 word  | number of data bytes following (back-patched)
///      1 byte  | number of slot records
///      n bytes | slot records (9 bytes each)
///      1 dword | random seed
///      1 byte  | slot layout
///      1 byte  | number of start positions in the map
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub slots: Vec<SlotData>,
    pub random_seed: u32,
    pub slot_layout: u8,
    pub num_players: u8,
}

impl SlotInfo {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        let len_at = buf.reserve_u16();
        buf.write_u8(self.slots.len() as u8);
        for slot in &self.slots {
            slot.serialize_content(buf);
        }
        buf.write_u32(self.random_seed);
        buf.write_u8(self.slot_layout);
        buf.write_u8(self.num_players);
        buf.patch_u16(len_at, (buf.size() - len_at - 2) as u16);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 9 {
            return Err(W3Error::InvalidPacketSize);
        }

        let size = buf.read_u16() as usize;
        if size < 7 || buf.size() < size {
            return Err(W3Error::InvalidPacketSize);
        }
        let before = buf.size();

        let count = buf.read_u8() as usize;
        self.slots.clear();
        for _ in 0..count {
            let mut slot = SlotData::default();
            slot.deserialize_content(buf)?;
            self.slots.push(slot);
        }

        if buf.size() < 6 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.random_seed = buf.read_u32();
        self.slot_layout = buf.read_u8();
        self.num_players = buf.read_u8();

        if before - buf.size() != size {
            return Err(W3Error::BadFormat);
        }
        Ok(())
    }
}

/// One queued command block from a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub player_id: u8,
    pub data: Vec<u8>,
}

/// A simulation tick with the actions scheduled for it.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 word  | n = number of bytes that follow (back-patched)
///      1 word  | time increment in milliseconds
///     n-2 byte | action blocks (absent when n = 2):
///              |   1 byte  | player id
///              |   1 word  | data length
///              |   n bytes | data
/// ```
///
/// `fragment` is not part of the content; the wrapping packet or record
/// derives it from the tag in use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub fragment: bool,
    pub time_increment_ms: u16,
    pub actions: Vec<PlayerAction>,
}

impl TimeSlot {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        let len_at = buf.reserve_u16();
        buf.write_u16(self.time_increment_ms);
        for action in &self.actions {
            buf.write_u8(action.player_id);
            buf.write_u16(action.data.len() as u16);
            buf.write_blob(&action.data);
        }
        buf.patch_u16(len_at, (buf.size() - len_at - 2) as u16);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }

        let mut size = buf.read_u16() as isize;
        if size < 2 || (buf.size() as isize) < size {
            return Err(W3Error::InvalidPacketSize);
        }

        self.time_increment_ms = buf.read_u16();
        size -= 2;

        self.actions.clear();
        while size >= 3 {
            let player_id = buf.read_u8();
            let subsize = buf.read_u16() as isize;
            if size < subsize || (buf.size() as isize) < subsize {
                return Err(W3Error::BadFormat);
            }
            size -= 3 + subsize;

            self.actions.push(PlayerAction {
                player_id,
                data: buf.read_blob(subsize as usize),
            });
        }

        if size != 0 {
            return Err(W3Error::BadFormat);
        }
        Ok(())
    }
}

/// An in-game chat message or lobby state change.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 byte  | number of recipient ids
///      n bytes | recipient ids
///      1 byte  | sender id
///      1 byte  | message type
///      1 dword | scope (only for MSG_CHAT_EXTRA)
///     variable | text (zero terminated; chat types only)
///      1 byte  | new value (state-change types only)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub recipient_ids: Vec<u8>,
    pub sender_id: u8,
    pub msg_type: MessageType,
    pub scope: MessageScope,
    pub new_val: u8,
    pub content: String,
}

impl Message {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        buf.write_u8(self.recipient_ids.len() as u8);
        buf.write_blob(&self.recipient_ids);
        buf.write_u8(self.sender_id);
        buf.write_u8(self.msg_type);
        match self.msg_type {
            MSG_CHAT_EXTRA => {
                buf.write_u32(self.scope);
                buf.write_cstring(&self.content);
            }
            MSG_CHAT => buf.write_cstring(&self.content),
            _ => buf.write_u8(self.new_val),
        }
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }

        let count = buf.read_u8() as usize;
        if buf.size() < count + 3 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.recipient_ids = buf.read_blob(count);
        self.sender_id = buf.read_u8();
        self.msg_type = buf.read_u8();

        self.scope = SCOPE_ALL;
        self.new_val = 0;
        self.content = String::new();

        match self.msg_type {
            MSG_CHAT_EXTRA => {
                if buf.size() < 5 {
                    return Err(W3Error::InvalidPacketSize);
                }
                self.scope = buf.read_u32();
                self.content = buf.read_cstring()?;
            }
            MSG_CHAT => {
                self.content = buf.read_cstring()?;
            }
            _ => {
                self.new_val = buf.read_u8();
            }
        }
        Ok(())
    }
}

/// Simulation checksum exchange after a desync was detected.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 dword | tick count
///      1 byte  | checksum width (always 4)
///      1 dword | state checksum
///      1 byte  | number of players still in the checked state
///      n bytes | player ids
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desync {
    pub unknown1: u32,
    pub checksum: u32,
    pub players_in_state: Vec<u8>,
}

impl Desync {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        buf.write_u32(self.unknown1);
        buf.write_u8(4);
        buf.write_u32(self.checksum);
        buf.write_u8(self.players_in_state.len() as u8);
        buf.write_blob(&self.players_in_state);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 10 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.unknown1 = buf.read_u32();
        if buf.read_u8() != 4 {
            return Err(W3Error::UnexpectedConst);
        }
        self.checksum = buf.read_u32();

        let count = buf.read_u8() as usize;
        if buf.size() < count {
            return Err(W3Error::InvalidPacketSize);
        }
        self.players_in_state = buf.read_blob(count);
        Ok(())
    }
}

/// Extra per-player data (profiles, skins).
///
/// The payload is an embedded protobuf struct; it is preserved verbatim so
/// that rewriting a stream never loses information the decoder does not
/// model.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 byte  | sub type (0x03 profiles, 0x04 skins)
///      1 dword | number of bytes following
///      n bytes | protobuf-encoded payload
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerExtra {
    pub extra_type: u8,
    pub data: Vec<u8>,
}

impl PlayerExtra {
    pub fn serialize_content(&self, buf: &mut PacketBuffer) {
        buf.write_u8(self.extra_type);
        buf.write_u32(self.data.len() as u32);
        buf.write_blob(&self.data);
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer) -> Result<()> {
        if buf.size() < 5 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.extra_type = buf.read_u8();
        let size = buf.read_u32() as usize;
        if buf.size() < size {
            return Err(W3Error::InvalidPacketSize);
        }
        self.data = buf.read_blob(size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_settings_encoding_has_no_even_bytes() {
        let settings = GameSettings {
            game_setting_flags: SETTING_SPEED_NORMAL | SETTING_TERRAIN_DEFAULT,
            map_width: 116,
            map_height: 84,
            map_xoro: 0x2204_8AEC,
            map_path: "Maps\\FrozenThrone\\(4)TwistedMeadows.w3x".to_string(),
            host_name: "Grubby".to_string(),
            map_sha1: [7; 20],
        };

        let mut buf = PacketBuffer::new();
        settings.serialize_content(&mut buf);

        let encoded = &buf.as_slice()[..buf.size() - 1];
        assert!(encoded.iter().all(|&b| b % 2 == 1), "even byte in encoded block");
        assert_eq!(buf.as_slice()[buf.size() - 1], 0);

        let mut decoded = GameSettings::default();
        decoded.deserialize_content(&mut buf).unwrap();
        assert_eq!(decoded, settings);
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn game_settings_decode_resets_stale_sha() {
        let settings = GameSettings {
            map_path: "x".to_string(),
            ..Default::default()
        };

        let mut buf = PacketBuffer::new();
        settings.serialize_content(&mut buf);
        let mut decoded = GameSettings {
            map_sha1: [9; 20],
            ..Default::default()
        };
        decoded.deserialize_content(&mut buf).unwrap();
        assert_eq!(decoded.map_sha1, settings.map_sha1);
    }

    #[test]
    fn slot_info_roundtrip() {
        let info = SlotInfo {
            slots: vec![
                SlotData {
                    player_id: 1,
                    download_status: 0x64,
                    slot_status: SLOT_OCCUPIED,
                    computer: false,
                    team: 0,
                    color: 0,
                    race: RACE_NIGHT_ELF,
                    computer_type: AI_NORMAL,
                    handicap: 100,
                },
                SlotData {
                    player_id: 0,
                    download_status: 0x64,
                    slot_status: SLOT_OCCUPIED,
                    computer: true,
                    team: 1,
                    color: 1,
                    race: RACE_RANDOM,
                    computer_type: AI_INSANE,
                    handicap: 100,
                },
            ],
            random_seed: 0xDEAD_BEEF,
            slot_layout: LAYOUT_MELEE,
            num_players: 2,
        };

        let mut buf = PacketBuffer::new();
        info.serialize_content(&mut buf);

        let declared = u16::from_le_bytes([buf.as_slice()[0], buf.as_slice()[1]]) as usize;
        assert_eq!(declared, buf.size() - 2);

        let mut decoded = SlotInfo::default();
        decoded.deserialize_content(&mut buf).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn time_slot_roundtrip_and_backpatch() {
        let slot = TimeSlot {
            fragment: false,
            time_increment_ms: 250,
            actions: vec![
                PlayerAction {
                    player_id: 2,
                    data: vec![0x12, 0x34, 0x56],
                },
                PlayerAction {
                    player_id: 3,
                    data: vec![],
                },
            ],
        };

        let mut buf = PacketBuffer::new();
        slot.serialize_content(&mut buf);

        let declared = u16::from_le_bytes([buf.as_slice()[0], buf.as_slice()[1]]) as usize;
        assert_eq!(declared, buf.size() - 2);

        let mut decoded = TimeSlot::default();
        decoded.deserialize_content(&mut buf).unwrap();
        assert_eq!(decoded, slot);
    }

    #[test]
    fn time_slot_truncated_action_is_bad_format() {
        let mut buf = PacketBuffer::new();
        buf.write_u16(6);
        buf.write_u16(100);
        buf.write_u8(1);
        buf.write_u16(9);
        buf.write_u8(0);

        let mut decoded = TimeSlot::default();
        assert_eq!(decoded.deserialize_content(&mut buf), Err(W3Error::BadFormat));
    }

    #[test]
    fn message_variants_roundtrip() {
        let messages = [
            Message {
                recipient_ids: vec![1, 2, 3],
                sender_id: 4,
                msg_type: MSG_CHAT_EXTRA,
                scope: SCOPE_ALLIES,
                new_val: 0,
                content: "gl hf".to_string(),
            },
            Message {
                recipient_ids: vec![],
                sender_id: 1,
                msg_type: MSG_CHAT,
                scope: SCOPE_ALL,
                new_val: 0,
                content: "old-style chat".to_string(),
            },
            Message {
                recipient_ids: vec![2],
                sender_id: 1,
                msg_type: MSG_COLOR_CHANGE,
                scope: SCOPE_ALL,
                new_val: 7,
                content: String::new(),
            },
        ];

        for msg in &messages {
            let mut buf = PacketBuffer::new();
            msg.serialize_content(&mut buf);
            let mut decoded = Message::default();
            decoded.deserialize_content(&mut buf).unwrap();
            assert_eq!(&decoded, msg);
            assert_eq!(buf.size(), 0);
        }
    }

    #[test]
    fn desync_rejects_wrong_checksum_width() {
        let mut buf = PacketBuffer::new();
        buf.write_u32(1);
        buf.write_u8(8);
        buf.write_u32(2);
        buf.write_u8(0);

        let mut decoded = Desync::default();
        assert_eq!(
            decoded.deserialize_content(&mut buf),
            Err(W3Error::UnexpectedConst)
        );
    }

    #[test]
    fn player_extra_keeps_payload_verbatim() {
        let extra = PlayerExtra {
            extra_type: PLAYER_EXTRA_PROFILE,
            data: vec![0x0A, 0x0C, 0x08, 0x01, 0x12, 0x08, 0xFF, 0x00],
        };

        let mut buf = PacketBuffer::new();
        extra.serialize_content(&mut buf);
        let mut decoded = PlayerExtra::default();
        decoded.deserialize_content(&mut buf).unwrap();
        assert_eq!(decoded, extra);
    }
}
