//! Packet buffer with typed binary codecs
//!
//! [`PacketBuffer`] wraps a growable byte sequence and adds helper functions
//! for binary (de)serialization. Reads are destructive and consume from the
//! front; writes append to the back. Integers are little-endian, ports are
//! network byte order, strings are zero-terminated.
//!
//! The `*_at` overwrite primitives and the [`PacketBuffer::reserve_u16`] /
//! [`PacketBuffer::patch_u16`] pair exist for forward-referenced length
//! fields: variable-length bodies emit a placeholder, write their content,
//! then patch the measured length in once it is known.
//!
//! # Trust contract
//!
//! Fixed-width reads do not check the remaining size. Packet and record
//! deserializers validate `size()` up front and return
//! [`W3Error::InvalidPacketSize`] before issuing reads; the primitives
//! trust them. Reads past the end of a buffer are a caller bug and panic.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use bytes::{Buf, BufMut, BytesMut};
use w3net_core::{Result, W3Error};

/// Four-character identifier stored in reverse byte order.
///
/// Platform, product, and language codes travel as a 32-bit word whose
/// little-endian byte sequence spells the tag backwards. The value here
/// keeps the in-memory convention of the surrounding ecosystem (the
/// reversed form), so serialization reverses it back into the natural
/// on-wire spelling: `DString::new(*b"3RAW")` puts `WAR3` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DString(pub [u8; 4]);

impl DString {
    pub const fn new(tag: [u8; 4]) -> Self {
        Self(tag)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl TryFrom<&str> for DString {
    type Error = W3Error;

    fn try_from(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(W3Error::BadFormat);
        }
        Ok(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl From<[u8; 4]> for DString {
    fn from(tag: [u8; 4]) -> Self {
        Self(tag)
    }
}

impl fmt::Display for DString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            f.write_str(char::from(b).escape_default().to_string().as_str())?;
        }
        Ok(())
    }
}

impl serde::Serialize for DString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}

impl<'de> serde::Deserialize<'de> for DString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DString::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Growable byte buffer with a consume-from-front read cursor and an
/// append-to-back write cursor.
///
/// A buffer lives for the duration of one encode or decode and is not safe
/// for concurrent access. `size()` always equals the remaining unread
/// bytes; overwrite positions for the `*_at` primitives are relative to the
/// current front.
#[derive(Debug, Clone, Default)]
pub struct PacketBuffer {
    bytes: BytesMut,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(capacity),
        }
    }

    /// Total number of unread bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// View of the unread bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Discards all content.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Consumes `len` bytes and throws away the result.
    pub fn skip(&mut self, len: usize) {
        self.bytes.advance(len);
    }

    pub fn write_blob(&mut self, v: &[u8]) {
        self.bytes.put_slice(v);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.bytes.put_u8(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.bytes.put_u16_le(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.bytes.put_u32_le(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.bytes.put_u8(u8::from(v));
    }

    /// Bool carried in a 32-bit word.
    pub fn write_bool32(&mut self, v: bool) {
        self.write_u32(u32::from(v));
    }

    /// Ports are the one big-endian exception to the little-endian rule.
    pub fn write_port(&mut self, v: u16) {
        self.bytes.put_u16(v);
    }

    /// Appends a 4-byte IPv4 address.
    ///
    /// `None` stands for the null address and writes `0.0.0.0`. A non-IPv4
    /// address also writes four zero bytes, so the field keeps its width,
    /// but reports [`W3Error::InvalidIp4`]; framed serializers discard that
    /// error on purpose to keep their length fields correct.
    pub fn write_ip(&mut self, v: Option<IpAddr>) -> Result<()> {
        match v {
            None => {
                self.write_u32(0);
                Ok(())
            }
            Some(IpAddr::V4(ip4)) => {
                self.write_blob(&ip4.octets());
                Ok(())
            }
            Some(IpAddr::V6(ip6)) => match ip6.to_ipv4() {
                Some(ip4) => {
                    self.write_blob(&ip4.octets());
                    Ok(())
                }
                None => {
                    self.write_u32(0);
                    Err(W3Error::InvalidIp4)
                }
            },
        }
    }

    /// Appends a zero-terminated string.
    pub fn write_cstring(&mut self, s: &str) {
        self.write_blob(s.as_bytes());
        self.write_u8(0);
    }

    /// Appends a 4-byte identifier in reverse byte order.
    pub fn write_dstring(&mut self, v: DString) {
        let t = v.0;
        self.bytes.put_slice(&[t[3], t[2], t[1], t[0]]);
    }

    pub fn write_blob_at(&mut self, p: usize, v: &[u8]) {
        self.bytes[p..p + v.len()].copy_from_slice(v);
    }

    pub fn write_u8_at(&mut self, p: usize, v: u8) {
        self.bytes[p] = v;
    }

    pub fn write_u16_at(&mut self, p: usize, v: u16) {
        self.bytes[p..p + 2].copy_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32_at(&mut self, p: usize, v: u32) {
        self.bytes[p..p + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Writes a 16-bit placeholder and returns its position for a later
    /// [`PacketBuffer::patch_u16`].
    pub fn reserve_u16(&mut self) -> usize {
        let p = self.size();
        self.write_u16(0);
        p
    }

    /// Overwrites a placeholder created by [`PacketBuffer::reserve_u16`].
    pub fn patch_u16(&mut self, handle: usize, v: u16) {
        self.write_u16_at(handle, v);
    }

    pub fn reserve_u32(&mut self) -> usize {
        let p = self.size();
        self.write_u32(0);
        p
    }

    pub fn patch_u32(&mut self, handle: usize, v: u32) {
        self.write_u32_at(handle, v);
    }

    /// Consumes a blob of size `len` and returns its value.
    pub fn read_blob(&mut self, len: usize) -> Vec<u8> {
        self.bytes.split_to(len).to_vec()
    }

    pub fn read_u8(&mut self) -> u8 {
        self.bytes.get_u8()
    }

    pub fn read_u16(&mut self) -> u16 {
        self.bytes.get_u16_le()
    }

    pub fn read_u32(&mut self) -> u32 {
        self.bytes.get_u32_le()
    }

    pub fn read_bool(&mut self) -> bool {
        self.bytes.get_u8() > 0
    }

    pub fn read_bool32(&mut self) -> bool {
        self.read_u32() > 0
    }

    pub fn read_port(&mut self) -> u16 {
        self.bytes.get_u16()
    }

    /// Consumes a 4-byte IPv4 address; `0.0.0.0` reads back as `None`.
    pub fn read_ip(&mut self) -> Option<IpAddr> {
        let octets = [self.read_u8(), self.read_u8(), self.read_u8(), self.read_u8()];
        if octets == [0, 0, 0, 0] {
            return None;
        }
        Some(IpAddr::V4(Ipv4Addr::from(octets)))
    }

    /// Consumes bytes up to (and including) the next zero terminator and
    /// returns the prefix. Without a terminator in the remaining bytes the
    /// buffer is drained to empty and the read fails.
    pub fn read_cstring_bytes(&mut self) -> Result<Vec<u8>> {
        match self.bytes.iter().position(|&b| b == 0) {
            Some(pos) => {
                let res = self.bytes.split_to(pos).to_vec();
                self.bytes.advance(1);
                Ok(res)
            }
            None => {
                self.bytes.clear();
                Err(W3Error::NoStringTerminator)
            }
        }
    }

    /// Consumes a zero-terminated string.
    pub fn read_cstring(&mut self) -> Result<String> {
        let bytes = self.read_cstring_bytes()?;
        String::from_utf8(bytes).map_err(|_| W3Error::BadFormat)
    }

    /// Consumes a 4-byte identifier written in reverse byte order.
    pub fn read_dstring(&mut self) -> DString {
        let b = [self.read_u8(), self.read_u8(), self.read_u8(), self.read_u8()];
        DString([b[3], b[2], b[1], b[0]])
    }
}

impl From<&[u8]> for PacketBuffer {
    fn from(v: &[u8]) -> Self {
        Self {
            bytes: BytesMut::from(v),
        }
    }
}

impl From<Vec<u8>> for PacketBuffer {
    fn from(v: Vec<u8>) -> Self {
        Self {
            bytes: BytesMut::from(&v[..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_roundtrip_little_endian() {
        let mut buf = PacketBuffer::new();
        buf.write_u32(0x0403_0201);
        assert_eq!(buf.as_slice(), &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(buf.read_u32(), 0x0403_0201);
        assert_eq!(buf.size(), 0);

        buf.write_u16(0x1234);
        assert_eq!(buf.as_slice(), &[0x34, 0x12]);
        assert_eq!(buf.read_u16(), 0x1234);
    }

    #[test]
    fn port_is_big_endian() {
        let mut buf = PacketBuffer::new();
        buf.write_port(0x1234);
        assert_eq!(buf.as_slice(), &[0x12, 0x34]);
        assert_eq!(buf.read_port(), 0x1234);
    }

    #[test]
    fn bool_codecs() {
        let mut buf = PacketBuffer::new();
        buf.write_bool(true);
        buf.write_bool(false);
        buf.write_bool32(true);
        assert_eq!(buf.as_slice(), &[1, 0, 1, 0, 0, 0]);
        assert!(buf.read_bool());
        assert!(!buf.read_bool());
        assert!(buf.read_bool32());
    }

    #[test]
    fn dstring_reverses_bytes() {
        let mut buf = PacketBuffer::new();
        buf.write_dstring(DString::try_from("68xi").unwrap());
        assert_eq!(buf.as_slice(), &[0x69, 0x78, 0x38, 0x36]);
        assert_eq!(buf.read_dstring(), DString::try_from("68xi").unwrap());
    }

    #[test]
    fn cstring_roundtrip() {
        let mut buf = PacketBuffer::new();
        buf.write_cstring("The Void");
        assert_eq!(buf.size(), 9);
        assert_eq!(buf.read_cstring().unwrap(), "The Void");
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn cstring_without_terminator_drains_buffer() {
        let mut buf = PacketBuffer::from(&b"no terminator here"[..]);
        assert_eq!(buf.read_cstring(), Err(W3Error::NoStringTerminator));
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn ip_zero_reads_as_none() {
        let mut buf = PacketBuffer::new();
        buf.write_ip(None).unwrap();
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0]);
        assert_eq!(buf.read_ip(), None);

        buf.write_ip(Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)))).unwrap();
        assert_eq!(buf.as_slice(), &[1, 1, 1, 1]);
        assert_eq!(buf.read_ip(), Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))));
    }

    #[test]
    fn non_ip4_writes_zeroes_and_fails() {
        let mut buf = PacketBuffer::new();
        let ip6: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(buf.write_ip(Some(ip6)), Err(W3Error::InvalidIp4));
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn skip_discards_prefix() {
        let mut buf = PacketBuffer::from(&[1u8, 2, 3, 4, 5][..]);
        buf.skip(2);
        assert_eq!(buf.size(), 3);
        assert_eq!(buf.read_u8(), 3);
    }

    #[test]
    fn reserve_and_patch() {
        let mut buf = PacketBuffer::new();
        buf.write_u8(0xFF);
        let handle = buf.reserve_u16();
        buf.write_blob(&[9, 9, 9]);
        buf.patch_u16(handle, (buf.size() - handle - 2) as u16);
        assert_eq!(buf.as_slice(), &[0xFF, 3, 0, 9, 9, 9]);
    }

    #[test]
    fn write_at_overwrites_in_place() {
        let mut buf = PacketBuffer::new();
        buf.write_u32(0);
        buf.write_u32(0);
        buf.write_u16_at(0, 0xBEEF);
        buf.write_u32_at(4, 0xDEAD_BEEF);
        assert_eq!(buf.read_u16(), 0xBEEF);
        buf.skip(2);
        assert_eq!(buf.read_u32(), 0xDEAD_BEEF);
    }

    #[test]
    fn blob_roundtrip() {
        let mut buf = PacketBuffer::new();
        buf.write_blob(&[1, 2, 3]);
        assert_eq!(buf.read_blob(0), Vec::<u8>::new());
        assert_eq!(buf.read_blob(3), vec![1, 2, 3]);
    }
}
