//! Replay records
//!
//! The replay payload is a concatenation of records. Each record begins
//! with a single-byte tag and carries no parent length; the stream ends
//! when the underlying reader runs out between records. Records embedding
//! a game-session structure delegate their body entirely to that
//! structure's `*_content` codecs and contribute only the tag byte.
//!
//! Two tags are version-dependent. `0x20` carries chat messages in every
//! dialect except game versions 1 and 2, where it carries time-slot
//! acknowledgements instead; `0x1E` and `0x1F` both decode to
//! [`TimeSlot`], with the distinction kept in the `fragment` flag and the
//! `0x1F` form forced for versions 1 and 2.

use serde::{Deserialize, Serialize};
use w3net_core::{Encoding, PacketFactory, Result, W3Error};
use w3net_protocol::w3gs::{self, GameFlags, LeaveReason, RacePref, MSG_CHAT, MSG_CHAT_EXTRA, SCOPE_ALL};
use w3net_protocol::PacketBuffer;

pub const RID_GAME_INFO: u8 = 0x10;
pub const RID_PLAYER_INFO: u8 = 0x16;
pub const RID_PLAYER_LEFT: u8 = 0x17;
pub const RID_SLOT_INFO: u8 = 0x19;
pub const RID_COUNT_DOWN_START: u8 = 0x1A;
pub const RID_COUNT_DOWN_END: u8 = 0x1B;
pub const RID_GAME_START: u8 = 0x1C;
pub const RID_TIME_SLOT: u8 = 0x1E;
pub const RID_TIME_SLOT2: u8 = 0x1F;
pub const RID_CHAT_MESSAGE: u8 = 0x20;
pub const RID_TIME_SLOT_ACK: u8 = 0x22;
pub const RID_DESYNC: u8 = 0x23;
pub const RID_END_TIMER: u8 = 0x2F;
pub const RID_PLAYER_EXTRA: u8 = 0x39;

/// Game header record [0x10].
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 dword | number of host records (always 1)
///     variable | host player (PlayerInfo content)
///     variable | game name (zero terminated)
///      1 byte  | zero
///     variable | encoded game settings (zero terminated)
///      1 dword | number of slots
///      1 dword | game flags
///      1 dword | language id
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    pub host_player: PlayerInfo,
    pub game_name: String,
    pub game_settings: w3gs::GameSettings,
    pub game_flags: GameFlags,
    pub num_slots: u32,
    pub language_id: u32,
}

impl GameInfo {
    pub fn serialize(&self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        buf.write_u8(RID_GAME_INFO);

        buf.write_u32(1);
        self.host_player.serialize_content(buf, enc);

        buf.write_cstring(&self.game_name);
        buf.write_u8(0);

        self.game_settings.serialize_content(buf);
        buf.write_u32(self.num_slots);
        buf.write_u32(self.game_flags);
        buf.write_u32(self.language_id);

        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<()> {
        if buf.size() < 24 {
            return Err(W3Error::InvalidPacketSize);
        }

        buf.skip(1);
        if buf.read_u32() != 1 {
            return Err(W3Error::UnexpectedConst);
        }

        self.host_player.deserialize_content(buf, enc)?;

        if buf.size() < 15 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.game_name = buf.read_cstring()?;

        if buf.size() < 14 {
            return Err(W3Error::InvalidPacketSize);
        }
        if buf.read_u8() != 0 {
            return Err(W3Error::UnexpectedConst);
        }

        self.game_settings.deserialize_content(buf)?;

        if buf.size() < 12 {
            return Err(W3Error::InvalidPacketSize);
        }
        self.num_slots = buf.read_u32();
        self.game_flags = buf.read_u32();
        self.language_id = buf.read_u32();
        Ok(())
    }
}

/// Player identity record [0x16].
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 byte  | player id
///     variable | player name (zero terminated)
///      1 byte  | size of additional data:
///              |   0x01 = custom game (one zero byte)
///              |   0x08 = ladder (runtime + race flags)
///      1 dword | trailing counter (record form only)
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u8,
    pub name: String,
    pub race: RacePref,
    pub join_counter: u32,
}

impl PlayerInfo {
    pub fn serialize(&self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        buf.write_u8(RID_PLAYER_INFO);
        self.serialize_content(buf, enc);
        buf.write_u32(0);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<()> {
        if buf.size() < 9 {
            return Err(W3Error::InvalidPacketSize);
        }

        buf.skip(1);
        self.deserialize_content(buf, enc)?;

        if buf.size() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(4);
        Ok(())
    }

    /// Encodes the struct without tag and trailing counter, for embedding
    /// in [`GameInfo`].
    pub fn serialize_content(&self, buf: &mut PacketBuffer, _enc: &Encoding) {
        buf.write_u8(self.id);
        buf.write_cstring(&self.name);

        if self.join_counter == 0 && self.race == 0 {
            buf.write_u8(1);
            buf.write_u8(0);
        } else {
            buf.write_u8(8);
            buf.write_u32(self.join_counter);
            buf.write_u32(self.race);
        }
    }

    pub fn deserialize_content(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }

        self.id = buf.read_u8();
        self.name = buf.read_cstring()?;

        if buf.size() < 2 {
            return Err(W3Error::InvalidPacketSize);
        }

        let len = buf.read_u8();
        if buf.size() < len as usize {
            return Err(W3Error::InvalidPacketSize);
        }

        match len {
            0x01 | 0x02 => {
                buf.skip(len as usize);
                self.join_counter = 0;
                self.race = 0;
            }
            0x00 => {
                self.join_counter = 0;
                self.race = 0;
            }
            0x08 => {
                self.join_counter = buf.read_u32();
                self.race = buf.read_u32();
            }
            _ => return Err(W3Error::UnexpectedConst),
        }
        Ok(())
    }
}

/// A player left the game [0x17].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerLeft {
    /// Whether the connection was closed by the local game.
    pub local: bool,
    pub player_id: u8,
    pub reason: LeaveReason,
    pub counter: u32,
}

impl PlayerLeft {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        buf.write_u8(RID_PLAYER_LEFT);
        if self.local {
            buf.write_u32(0x0C);
        } else {
            buf.write_u32(0x01);
        }
        buf.write_u8(self.player_id);
        buf.write_u32(self.reason);
        buf.write_u32(self.counter);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 14 {
            return Err(W3Error::InvalidPacketSize);
        }

        buf.skip(1);
        match buf.read_u32() {
            0x01 | 0x0E => self.local = false,
            0x0C => self.local = true,
            _ => return Err(W3Error::UnexpectedConst),
        }
        self.player_id = buf.read_u8();
        self.reason = buf.read_u32();
        self.counter = buf.read_u32();
        Ok(())
    }
}

/// Start-screen slot table [0x19]; body shared with the session protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub slot_info: w3gs::SlotInfo,
}

impl SlotInfo {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        buf.write_u8(RID_SLOT_INFO);
        self.slot_info.serialize_content(buf);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 10 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(1);
        self.slot_info.deserialize_content(buf)
    }
}

/// Game simulation begins [0x1C].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStart;

impl GameStart {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        buf.write_u8(RID_GAME_START);
        buf.write_u32(0x01);
        Ok(5)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 5 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(1);
        if buf.read_u32() != 0x01 {
            return Err(W3Error::UnexpectedConst);
        }
        Ok(())
    }
}

/// Lobby countdown started [0x1A].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDownStart;

impl CountDownStart {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        buf.write_u8(RID_COUNT_DOWN_START);
        buf.write_u32(0x01);
        Ok(5)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 5 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(1);
        if buf.read_u32() != 0x01 {
            return Err(W3Error::UnexpectedConst);
        }
        Ok(())
    }
}

/// Lobby countdown finished [0x1B].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDownEnd;

impl CountDownEnd {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        buf.write_u8(RID_COUNT_DOWN_END);
        buf.write_u32(0x01);
        Ok(5)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 5 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(1);
        if buf.read_u32() != 0x01 {
            return Err(W3Error::UnexpectedConst);
        }
        Ok(())
    }
}

/// Simulation tick [0x1E], or [0x1F] for fragments.
///
/// Versions 1 and 2 only know the `0x1F` form, so serialization forces it
/// there regardless of the fragment flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time_slot: w3gs::TimeSlot,
}

impl TimeSlot {
    pub fn serialize(&self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        if self.time_slot.fragment || (enc.game_version > 0 && enc.game_version <= 2) {
            buf.write_u8(RID_TIME_SLOT2);
        } else {
            buf.write_u8(RID_TIME_SLOT);
        }
        self.time_slot.serialize_content(buf);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<()> {
        if buf.size() < 5 {
            return Err(W3Error::InvalidPacketSize);
        }

        let fragment =
            buf.read_u8() == RID_TIME_SLOT2 && (enc.game_version == 0 || enc.game_version > 2);
        self.time_slot.deserialize_content(buf)?;
        self.time_slot.fragment = fragment;
        Ok(())
    }
}

/// Chat message [0x20].
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///      1 byte  | sender id
///      1 word  | n = number of bytes that follow
///      1 byte  | message type
///      1 dword | scope (only for MSG_CHAT_EXTRA)
///      n bytes | zero-terminated text, or one state byte
/// ```
///
/// Some third-party clients append further zero-terminated strings inside
/// the declared length; those are concatenated onto the text as long as
/// every byte is printable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: w3gs::Message,
}

impl ChatMessage {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        let m = &self.message;

        buf.write_u8(RID_CHAT_MESSAGE);
        buf.write_u8(m.sender_id);

        match m.msg_type {
            MSG_CHAT_EXTRA => buf.write_u16(6 + m.content.len() as u16),
            MSG_CHAT => buf.write_u16(2 + m.content.len() as u16),
            _ => buf.write_u16(2),
        }

        buf.write_u8(m.msg_type);
        match m.msg_type {
            MSG_CHAT_EXTRA => {
                buf.write_u32(m.scope);
                buf.write_cstring(&m.content);
            }
            MSG_CHAT => buf.write_cstring(&m.content),
            _ => buf.write_u8(m.new_val),
        }

        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 4 {
            return Err(W3Error::InvalidPacketSize);
        }

        buf.skip(1);
        let m = &mut self.message;
        m.recipient_ids.clear();
        m.sender_id = buf.read_u8();
        m.scope = SCOPE_ALL;
        m.new_val = 0;
        m.content = String::new();

        let mut size = buf.read_u16() as isize;
        if size < 2 || (buf.size() as isize) < size {
            return Err(W3Error::InvalidPacketSize);
        }

        m.msg_type = buf.read_u8();
        match m.msg_type {
            MSG_CHAT_EXTRA | MSG_CHAT => {
                if m.msg_type == MSG_CHAT_EXTRA {
                    if size < 6 {
                        return Err(W3Error::BadFormat);
                    }
                    size -= 4;
                    m.scope = buf.read_u32();
                }

                m.content = buf.read_cstring()?;
                size -= 2 + m.content.len() as isize;

                while size > 0 {
                    let extra = buf.read_cstring()?;
                    if extra.chars().any(char::is_control) {
                        return Err(W3Error::BadFormat);
                    }
                    size -= extra.len() as isize + 1;
                    m.content.push_str(&extra);
                }
                if size != 0 {
                    return Err(W3Error::BadFormat);
                }
            }
            _ => {
                if size != 2 {
                    return Err(W3Error::BadFormat);
                }
                m.new_val = buf.read_u8();
            }
        }
        Ok(())
    }
}

/// Time-slot acknowledgement with the local state checksum [0x22].
///
/// Game versions 1 and 2 emit this under tag `0x20`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotAck {
    pub checksum: Vec<u8>,
}

impl TimeSlotAck {
    pub fn serialize(&self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        if enc.game_version == 0 || enc.game_version > 2 {
            buf.write_u8(RID_TIME_SLOT_ACK);
        } else {
            buf.write_u8(RID_CHAT_MESSAGE);
        }
        buf.write_u8(self.checksum.len() as u8);
        buf.write_blob(&self.checksum);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 2 {
            return Err(W3Error::InvalidPacketSize);
        }

        buf.skip(1);
        let size = buf.read_u8() as usize;
        if buf.size() < size {
            return Err(W3Error::InvalidPacketSize);
        }
        self.checksum = buf.read_blob(size);
        Ok(())
    }
}

/// Desync notification [0x23]; body shared with the session protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Desync {
    pub desync: w3gs::Desync,
}

impl Desync {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        buf.write_u8(RID_DESYNC);
        self.desync.serialize_content(buf);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 11 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(1);
        self.desync.deserialize_content(buf)
    }
}

/// Forced-end countdown state [0x2F].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndTimer {
    pub game_over: bool,
    pub count_down_sec: u32,
}

impl EndTimer {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        buf.write_u8(RID_END_TIMER);
        buf.write_bool32(self.game_over);
        buf.write_u32(self.count_down_sec);
        Ok(9)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 9 {
            return Err(W3Error::InvalidPacketSize);
        }

        buf.skip(1);
        self.game_over = buf.read_bool32();
        self.count_down_sec = buf.read_u32();
        Ok(())
    }
}

/// Extra player data [0x39]; body shared with the session protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerExtra {
    pub player_extra: w3gs::PlayerExtra,
}

impl PlayerExtra {
    pub fn serialize(&self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<usize> {
        let start = buf.size();
        buf.write_u8(RID_PLAYER_EXTRA);
        self.player_extra.serialize_content(buf);
        Ok(buf.size() - start)
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, _enc: &Encoding) -> Result<()> {
        if buf.size() < 6 {
            return Err(W3Error::InvalidPacketSize);
        }
        buf.skip(1);
        self.player_extra.deserialize_content(buf)
    }
}

/// Closed sum over the record catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    GameInfo(GameInfo),
    PlayerInfo(PlayerInfo),
    PlayerLeft(PlayerLeft),
    SlotInfo(SlotInfo),
    CountDownStart(CountDownStart),
    CountDownEnd(CountDownEnd),
    GameStart(GameStart),
    TimeSlot(TimeSlot),
    ChatMessage(ChatMessage),
    TimeSlotAck(TimeSlotAck),
    Desync(Desync),
    EndTimer(EndTimer),
    PlayerExtra(PlayerExtra),
}

impl Record {
    pub fn serialize(&self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<usize> {
        match self {
            Record::GameInfo(r) => r.serialize(buf, enc),
            Record::PlayerInfo(r) => r.serialize(buf, enc),
            Record::PlayerLeft(r) => r.serialize(buf, enc),
            Record::SlotInfo(r) => r.serialize(buf, enc),
            Record::CountDownStart(r) => r.serialize(buf, enc),
            Record::CountDownEnd(r) => r.serialize(buf, enc),
            Record::GameStart(r) => r.serialize(buf, enc),
            Record::TimeSlot(r) => r.serialize(buf, enc),
            Record::ChatMessage(r) => r.serialize(buf, enc),
            Record::TimeSlotAck(r) => r.serialize(buf, enc),
            Record::Desync(r) => r.serialize(buf, enc),
            Record::EndTimer(r) => r.serialize(buf, enc),
            Record::PlayerExtra(r) => r.serialize(buf, enc),
        }
    }

    pub fn deserialize(&mut self, buf: &mut PacketBuffer, enc: &Encoding) -> Result<()> {
        match self {
            Record::GameInfo(r) => r.deserialize(buf, enc),
            Record::PlayerInfo(r) => r.deserialize(buf, enc),
            Record::PlayerLeft(r) => r.deserialize(buf, enc),
            Record::SlotInfo(r) => r.deserialize(buf, enc),
            Record::CountDownStart(r) => r.deserialize(buf, enc),
            Record::CountDownEnd(r) => r.deserialize(buf, enc),
            Record::GameStart(r) => r.deserialize(buf, enc),
            Record::TimeSlot(r) => r.deserialize(buf, enc),
            Record::ChatMessage(r) => r.deserialize(buf, enc),
            Record::TimeSlotAck(r) => r.deserialize(buf, enc),
            Record::Desync(r) => r.deserialize(buf, enc),
            Record::EndTimer(r) => r.deserialize(buf, enc),
            Record::PlayerExtra(r) => r.deserialize(buf, enc),
        }
    }
}

/// Maps the tag table to fresh record values, honoring the
/// version-conditional meaning of tag `0x20`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFactory;

impl PacketFactory<Record> for DefaultFactory {
    fn new_instance(&self, tag: u8, enc: &Encoding) -> Option<Record> {
        Some(match tag {
            RID_GAME_INFO => Record::GameInfo(GameInfo::default()),
            RID_PLAYER_INFO => Record::PlayerInfo(PlayerInfo::default()),
            RID_PLAYER_LEFT => Record::PlayerLeft(PlayerLeft::default()),
            RID_SLOT_INFO => Record::SlotInfo(SlotInfo::default()),
            RID_COUNT_DOWN_START => Record::CountDownStart(CountDownStart),
            RID_COUNT_DOWN_END => Record::CountDownEnd(CountDownEnd),
            RID_GAME_START => Record::GameStart(GameStart),
            RID_TIME_SLOT | RID_TIME_SLOT2 => Record::TimeSlot(TimeSlot::default()),
            RID_CHAT_MESSAGE => {
                if enc.game_version == 0 || enc.game_version > 2 {
                    Record::ChatMessage(ChatMessage::default())
                } else {
                    Record::TimeSlotAck(TimeSlotAck::default())
                }
            }
            RID_TIME_SLOT_ACK => Record::TimeSlotAck(TimeSlotAck::default()),
            RID_DESYNC => Record::Desync(Desync::default()),
            RID_END_TIMER => Record::EndTimer(EndTimer::default()),
            RID_PLAYER_EXTRA => Record::PlayerExtra(PlayerExtra::default()),
            _ => return None,
        })
    }
}

/// Serializes one record and returns the bytes written.
pub fn serialize_record(buf: &mut PacketBuffer, rec: &Record, enc: &Encoding) -> Result<usize> {
    rec.serialize(buf, enc)
}

/// Deserializes the next record using [`DefaultFactory`].
pub fn deserialize_record(buf: &mut PacketBuffer, enc: &Encoding) -> Result<(Record, usize)> {
    deserialize_record_with(buf, enc, &DefaultFactory)
}

/// Deserializes the next record, consulting `factory` for the variant.
///
/// Records carry no parent length, so an unknown tag cannot be skipped and
/// surfaces [`W3Error::NoFactory`].
pub fn deserialize_record_with<F>(
    buf: &mut PacketBuffer,
    enc: &Encoding,
    factory: &F,
) -> Result<(Record, usize)>
where
    F: PacketFactory<Record>,
{
    if buf.size() < 1 {
        return Err(W3Error::InvalidPacketSize);
    }

    let tag = buf.as_slice()[0];
    let mut rec = factory.new_instance(tag, enc).ok_or(W3Error::NoFactory)?;

    let before = buf.size();
    rec.deserialize(buf, enc)?;
    Ok((rec, before - buf.size()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use w3net_core::FactoryCache;
    use w3net_protocol::w3gs::{Message, PlayerAction, SlotData};

    fn catalog() -> Vec<Record> {
        vec![
            Record::GameInfo(GameInfo::default()),
            Record::GameInfo(GameInfo {
                host_player: PlayerInfo {
                    id: 1,
                    name: "Happy".to_string(),
                    race: 0,
                    join_counter: 0,
                },
                game_name: "Local Game".to_string(),
                game_settings: w3gs::GameSettings {
                    game_setting_flags: w3gs::SETTING_SPEED_FAST,
                    map_width: 116,
                    map_height: 84,
                    map_xoro: 0x1357_9BDF,
                    map_path: "Maps\\(4)TwistedMeadows.w3x".to_string(),
                    host_name: "Happy".to_string(),
                    map_sha1: [11; 20],
                },
                game_flags: w3gs::GAME_FLAG_CUSTOM_GAME,
                num_slots: 4,
                language_id: 0,
            }),
            Record::PlayerInfo(PlayerInfo::default()),
            Record::PlayerInfo(PlayerInfo {
                id: 2,
                name: "Moon".to_string(),
                race: w3gs::RACE_NIGHT_ELF,
                join_counter: 1,
            }),
            Record::PlayerLeft(PlayerLeft {
                local: true,
                player_id: 2,
                reason: w3gs::LEAVE_WON,
                counter: 3,
            }),
            Record::PlayerLeft(PlayerLeft::default()),
            Record::SlotInfo(SlotInfo::default()),
            Record::SlotInfo(SlotInfo {
                slot_info: w3gs::SlotInfo {
                    slots: vec![SlotData {
                        player_id: 1,
                        download_status: 0x64,
                        slot_status: w3gs::SLOT_OCCUPIED,
                        computer: false,
                        team: 0,
                        color: 3,
                        race: w3gs::RACE_ORC,
                        computer_type: w3gs::AI_NORMAL,
                        handicap: 90,
                    }],
                    random_seed: 0xCAFE_F00D,
                    slot_layout: w3gs::LAYOUT_MELEE,
                    num_players: 1,
                },
            }),
            Record::CountDownStart(CountDownStart),
            Record::CountDownEnd(CountDownEnd),
            Record::GameStart(GameStart),
            Record::TimeSlot(TimeSlot::default()),
            Record::TimeSlot(TimeSlot {
                time_slot: w3gs::TimeSlot {
                    fragment: false,
                    time_increment_ms: 250,
                    actions: vec![PlayerAction {
                        player_id: 1,
                        data: vec![0x16, 0x01, 0x00],
                    }],
                },
            }),
            Record::ChatMessage(ChatMessage {
                message: Message {
                    recipient_ids: vec![],
                    sender_id: 2,
                    msg_type: MSG_CHAT_EXTRA,
                    scope: SCOPE_ALL,
                    new_val: 0,
                    content: "hi".to_string(),
                },
            }),
            Record::ChatMessage(ChatMessage {
                message: Message {
                    recipient_ids: vec![],
                    sender_id: 1,
                    msg_type: w3gs::MSG_COLOR_CHANGE,
                    scope: SCOPE_ALL,
                    new_val: 5,
                    content: String::new(),
                },
            }),
            Record::TimeSlotAck(TimeSlotAck {
                checksum: vec![0xDE, 0xAD, 0xBE, 0xEF],
            }),
            Record::Desync(Desync::default()),
            Record::EndTimer(EndTimer {
                game_over: true,
                count_down_sec: 60,
            }),
            Record::PlayerExtra(PlayerExtra {
                player_extra: w3gs::PlayerExtra {
                    extra_type: w3gs::PLAYER_EXTRA_PROFILE,
                    data: vec![0x08, 0x01, 0x12, 0x03, 0x61, 0x62, 0x63],
                },
            }),
        ]
    }

    #[test]
    fn records_roundtrip_across_versions() {
        for version in [0u32, 1, 2, 26, 30] {
            let enc = Encoding::new(version);
            for rec in catalog() {
                // Old dialects have no chat records on the wire.
                if version >= 1 && version <= 2 && matches!(rec, Record::ChatMessage(_)) {
                    continue;
                }

                let mut buf = PacketBuffer::with_capacity(2048);
                let written = rec.serialize(&mut buf, &enc).unwrap();
                assert_eq!(written, buf.size(), "{rec:?} v{version}");

                let (decoded, consumed) = deserialize_record(&mut buf, &enc).unwrap();
                assert_eq!(consumed, written, "{rec:?} v{version}");
                assert_eq!(decoded, rec, "v{version}");
                assert_eq!(buf.size(), 0, "{rec:?} v{version}");

                let mut probe = rec.clone();
                assert_eq!(
                    probe.deserialize(&mut PacketBuffer::new(), &enc),
                    Err(W3Error::InvalidPacketSize),
                    "{rec:?} v{version}"
                );
            }
        }
    }

    #[test]
    fn chat_message_wire_bytes() {
        let rec = Record::ChatMessage(ChatMessage {
            message: Message {
                recipient_ids: vec![],
                sender_id: 2,
                msg_type: MSG_CHAT_EXTRA,
                scope: SCOPE_ALL,
                new_val: 0,
                content: "hi".to_string(),
            },
        });

        let mut buf = PacketBuffer::new();
        rec.serialize(&mut buf, &Encoding::default()).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[0x20, 0x02, 0x08, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x68, 0x69, 0x00]
        );
    }

    #[test]
    fn time_slot_tag_depends_on_version_and_fragment() {
        let rec = TimeSlot::default();

        let mut buf = PacketBuffer::new();
        rec.serialize(&mut buf, &Encoding::new(2)).unwrap();
        assert_eq!(buf.as_slice()[0], RID_TIME_SLOT2);

        let mut buf = PacketBuffer::new();
        rec.serialize(&mut buf, &Encoding::new(30)).unwrap();
        assert_eq!(buf.as_slice()[0], RID_TIME_SLOT);

        let frag = TimeSlot {
            time_slot: w3gs::TimeSlot {
                fragment: true,
                ..Default::default()
            },
        };
        let mut buf = PacketBuffer::new();
        frag.serialize(&mut buf, &Encoding::new(30)).unwrap();
        assert_eq!(buf.as_slice()[0], RID_TIME_SLOT2);

        let (decoded, _) = deserialize_record(&mut buf, &Encoding::new(30)).unwrap();
        match decoded {
            Record::TimeSlot(ts) => assert!(ts.time_slot.fragment),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn tag_0x20_is_version_conditional() {
        let factory = DefaultFactory;

        for version in [0u32, 3, 26, 30] {
            let rec = factory
                .new_instance(RID_CHAT_MESSAGE, &Encoding::new(version))
                .unwrap();
            assert!(matches!(rec, Record::ChatMessage(_)), "v{version}");
        }
        for version in [1u32, 2] {
            let rec = factory
                .new_instance(RID_CHAT_MESSAGE, &Encoding::new(version))
                .unwrap();
            assert!(matches!(rec, Record::TimeSlotAck(_)), "v{version}");
        }
    }

    #[test]
    fn time_slot_ack_uses_chat_tag_in_old_dialects() {
        let ack = TimeSlotAck {
            checksum: vec![1, 2, 3, 4],
        };

        let enc = Encoding::new(1);
        let mut buf = PacketBuffer::new();
        ack.serialize(&mut buf, &enc).unwrap();
        assert_eq!(buf.as_slice()[0], RID_CHAT_MESSAGE);

        let (decoded, _) = deserialize_record(&mut buf, &enc).unwrap();
        assert_eq!(decoded, Record::TimeSlotAck(ack));
    }

    #[test]
    fn chat_continuations_are_concatenated() {
        let mut buf = PacketBuffer::new();
        buf.write_u8(RID_CHAT_MESSAGE);
        buf.write_u8(1);
        buf.write_u16(7);
        buf.write_u8(MSG_CHAT);
        buf.write_cstring("hi");
        buf.write_cstring("yo");

        let (decoded, _) = deserialize_record(&mut buf, &Encoding::default()).unwrap();
        match decoded {
            Record::ChatMessage(c) => assert_eq!(c.message.content, "hiyo"),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn non_printable_continuation_is_bad_format() {
        let mut buf = PacketBuffer::new();
        buf.write_u8(RID_CHAT_MESSAGE);
        buf.write_u8(1);
        buf.write_u16(7);
        buf.write_u8(MSG_CHAT);
        buf.write_cstring("hi");
        buf.write_blob(&[0x07, 0x41]);
        buf.write_u8(0);

        assert_eq!(
            deserialize_record(&mut buf, &Encoding::default()),
            Err(W3Error::BadFormat)
        );
    }

    #[test]
    fn unknown_tag_has_no_factory() {
        let mut buf = PacketBuffer::from(&[0xEEu8, 0x01, 0x02][..]);
        assert_eq!(
            deserialize_record(&mut buf, &Encoding::default()),
            Err(W3Error::NoFactory)
        );
    }

    #[test]
    fn cached_factory_matches_default() {
        let cache = FactoryCache::new(DefaultFactory);
        let enc = Encoding::new(26);

        let rec = Record::EndTimer(EndTimer {
            game_over: false,
            count_down_sec: 10,
        });
        let mut buf = PacketBuffer::new();
        rec.serialize(&mut buf, &enc).unwrap();

        let (decoded, _) = deserialize_record_with(&mut buf, &enc, &cache).unwrap();
        assert_eq!(decoded, rec);

        assert!(cache.new_instance(0xEE, &enc).is_none());
    }
}
