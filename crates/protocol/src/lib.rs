//! # w3net Protocol Library
//!
//! Binary codecs for the two wire formats of the classic Battle.net
//! ecosystem, with exact byte-level layouts:
//!
//! ## 1. Buffer Layer ([`buffer`])
//! [`PacketBuffer`] is the primitive-serialization substrate shared by
//! every codec in the workspace: little-endian integers, network-order
//! ports, IPv4 fields with a null-address sentinel, zero-terminated
//! strings, reversed 4-byte identifiers ([`DString`]), and explicit
//! back-patch handles for forward-referenced length fields.
//!
//! ## 2. Chat Service ([`bncs`])
//! The lobby and authentication protocol: `{0xFF, id, len:u16le}` frames,
//! a closed packet sum per direction-specific dispatch table, and a
//! verbatim unknown-packet fallback for forward compatibility.
//!
//! ## 3. Game Session ([`w3gs`])
//! The in-game protocol: `{0xF7, id, len:u16le}` frames plus the shared
//! leaf structures (`GameSettings`, `SlotInfo`, `TimeSlot`, `Message`,
//! `Desync`, `PlayerExtra`) whose `*_content` codecs are reused verbatim
//! by the replay record layer.
//!
//! ## Usage
//!
//! ```rust
//! use w3net_protocol::bncs;
//! use w3net_protocol::PacketBuffer;
//!
//! let mut buf = PacketBuffer::new();
//! bncs::serialize_packet(&mut buf, &bncs::Packet::Ping(bncs::Ping { payload: 123 }))?;
//! assert_eq!(buf.as_slice(), &[0xFF, 0x25, 0x08, 0x00, 0x7B, 0x00, 0x00, 0x00]);
//!
//! let (pkt, consumed) = bncs::deserialize_server_packet(&mut buf)?;
//! assert_eq!(consumed, 8);
//! assert_eq!(pkt, bncs::Packet::Ping(bncs::Ping { payload: 123 }));
//! # Ok::<(), w3net_core::W3Error>(())
//! ```
//!
//! A buffer is single-threaded; packet values are plain data and factories
//! are read-only, so disjoint buffers can be driven from as many threads
//! as needed without synchronization.

mod buffer;

pub mod bncs;
pub mod w3gs;

pub use buffer::*;
