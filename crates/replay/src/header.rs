//! Replay file header
//!
//! Every replay starts with a fixed 68-byte header: the signature line,
//! the container totals, a product/version sub-header, and a CRC32 over
//! the header itself (computed with the CRC field zeroed). Some
//! third-party tools prepend their own sub-headers to replay files, so
//! [`find_header`] scans for the signature instead of assuming offset 0.

use flate2::Crc;
use serde::{Deserialize, Serialize};
use w3net_core::{Result, W3Error};
use w3net_protocol::w3gs::GameVersion;
use w3net_protocol::PacketBuffer;

/// Signature line opening every replay file (28 bytes).
pub const SIGNATURE: [u8; 28] = *b"Warcraft III recorded game\x1A\0";

/// Fixed size of the serialized header.
pub const HEADER_SIZE: u32 = 68;

/// Only header layout version 1 is in circulation.
pub const HEADER_VERSION: u32 = 1;

const FLAG_MULTIPLAYER: u16 = 0x8000;

/// Container totals carried in the header; maintained by the block layer,
/// not by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Total file size, header included.
    pub compressed_size: u32,
    /// Number of meaningful payload bytes across all blocks.
    pub decompressed_size: u32,
    pub num_blocks: u32,
}

/// Replay file header.
///
/// # Format
/// ```text
///    size/type | Description
///   -----------+-----------------------------------------------
///     28 byte  | signature line
///      1 dword | header size (0x44)
///      1 dword | total file size
///      1 dword | header version (0x01)
///      1 dword | decompressed payload size
///      1 dword | number of blocks
///      4 byte  | product identifier
///      1 dword | game version
///      1 word  | build number
///      1 word  | flags (0x8000 = multiplayer)
///      1 dword | replay duration in milliseconds
///      1 dword | CRC32 of this header with the CRC field zeroed
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub game_version: GameVersion,
    pub build_number: u16,
    pub duration_ms: u32,
    pub single_player: bool,
}

impl Header {
    pub fn serialize(&self, buf: &mut PacketBuffer, info: &ContainerInfo) -> Result<usize> {
        let start = buf.size();
        buf.write_blob(&SIGNATURE);
        buf.write_u32(HEADER_SIZE);
        buf.write_u32(info.compressed_size);
        buf.write_u32(HEADER_VERSION);
        buf.write_u32(info.decompressed_size);
        buf.write_u32(info.num_blocks);
        self.game_version.serialize_content(buf);
        buf.write_u16(self.build_number);
        buf.write_u16(if self.single_player { 0 } else { FLAG_MULTIPLAYER });
        buf.write_u32(self.duration_ms);
        let crc_at = buf.reserve_u32();

        let mut crc = Crc::new();
        crc.update(&buf.as_slice()[start..]);
        buf.patch_u32(crc_at, crc.sum());
        Ok(buf.size() - start)
    }

    pub fn deserialize(buf: &mut PacketBuffer) -> Result<(Header, ContainerInfo)> {
        if buf.size() < HEADER_SIZE as usize {
            return Err(W3Error::InvalidPacketSize);
        }

        let mut crc = Crc::new();
        crc.update(&buf.as_slice()[..HEADER_SIZE as usize - 4]);
        crc.update(&[0u8; 4]);
        let expected = crc.sum();

        if buf.read_blob(28) != SIGNATURE {
            return Err(W3Error::BadFormat);
        }
        if buf.read_u32() != HEADER_SIZE {
            return Err(W3Error::UnexpectedConst);
        }
        let compressed_size = buf.read_u32();
        if buf.read_u32() != HEADER_VERSION {
            return Err(W3Error::UnexpectedConst);
        }
        let decompressed_size = buf.read_u32();
        let num_blocks = buf.read_u32();

        let mut game_version = GameVersion::default();
        game_version.deserialize_content(buf)?;
        let build_number = buf.read_u16();
        let flags = buf.read_u16();
        let duration_ms = buf.read_u32();

        if buf.read_u32() != expected {
            return Err(W3Error::InvalidChecksum);
        }

        Ok((
            Header {
                game_version,
                build_number,
                duration_ms,
                single_player: flags & FLAG_MULTIPLAYER == 0,
            },
            ContainerInfo {
                compressed_size,
                decompressed_size,
                num_blocks,
            },
        ))
    }
}

/// Scans for the signature line and returns its offset, if any.
pub fn find_header(data: &[u8]) -> Option<usize> {
    data.windows(SIGNATURE.len()).position(|w| w == SIGNATURE)
}
