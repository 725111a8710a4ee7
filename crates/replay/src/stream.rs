//! Compressed block stream
//!
//! Behind the header, the record payload is cut into 8 KiB chunks, each
//! deflated and framed as `{compressed_len:u16, decompressed_len:u16,
//! checksum:u32, data}`. The checksum packs the CRC32 of the block header
//! (CRC field zeroed) in its low half and the CRC32 of the compressed
//! payload in its high half. The final chunk is zero-padded to the full
//! block size; the header's decompressed total marks where the real
//! payload ends.
//!
//! [`RecordDecoder`] pulls blocks on demand and yields records until the
//! payload is exhausted; [`RecordEncoder`] streams records out and
//! back-fills the header totals on [`RecordEncoder::finish`]. Records may
//! span block boundaries.

use std::io::{Read, Seek, SeekFrom, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Crc};
use w3net_core::{Encoding, FactoryCache, Result, W3Error};
use w3net_protocol::PacketBuffer;

use crate::records::{deserialize_record_with, DefaultFactory, Record};
use crate::{ContainerInfo, Header, HEADER_SIZE};

/// Decompressed payload bytes per block.
pub const BLOCK_SIZE: usize = 8192;

fn block_checksum(head: &[u8; 8], compressed: &[u8]) -> u32 {
    let mut head_crc = Crc::new();
    head_crc.update(&head[..4]);
    head_crc.update(&[0u8; 4]);

    let mut data_crc = Crc::new();
    data_crc.update(compressed);

    (head_crc.sum() & 0xFFFF) | ((data_crc.sum() & 0xFFFF) << 16)
}

/// Streaming record reader over a replay positioned at its header.
pub struct RecordDecoder<R: Read> {
    inner: R,
    pub header: Header,
    pub encoding: Encoding,
    factory: FactoryCache<DefaultFactory, Record>,
    buf: PacketBuffer,
    blocks_left: u32,
    payload_left: u32,
}

impl<R: Read> RecordDecoder<R> {
    /// Reads and validates the header, leaving the stream at the first
    /// block.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut head = [0u8; HEADER_SIZE as usize];
        inner.read_exact(&mut head)?;

        let mut hbuf = PacketBuffer::from(&head[..]);
        let (header, info) = Header::deserialize(&mut hbuf)?;
        let encoding = Encoding::new(header.game_version.version);

        Ok(Self {
            inner,
            header,
            encoding,
            factory: FactoryCache::new(DefaultFactory),
            buf: PacketBuffer::with_capacity(2 * BLOCK_SIZE),
            blocks_left: info.num_blocks,
            payload_left: info.decompressed_size,
        })
    }

    /// Yields the next record, or `None` once the payload ends between
    /// records.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if !self.buf.is_empty() {
                let mut probe = PacketBuffer::from(self.buf.as_slice());
                match deserialize_record_with(&mut probe, &self.encoding, &self.factory) {
                    Ok((rec, n)) => {
                        self.buf.skip(n);
                        return Ok(Some(rec));
                    }
                    // A record cut off at a block boundary; pull more data.
                    Err(W3Error::InvalidPacketSize) | Err(W3Error::NoStringTerminator)
                        if self.blocks_left > 0 => {}
                    Err(e) => return Err(e),
                }
            } else if self.blocks_left == 0 || self.payload_left == 0 {
                return Ok(None);
            }
            self.read_block()?;
        }
    }

    /// Drives `f` over every remaining record.
    pub fn for_each<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        while let Some(rec) = self.next_record()? {
            f(&rec)?;
        }
        Ok(())
    }

    fn read_block(&mut self) -> Result<()> {
        if self.blocks_left == 0 {
            return Err(W3Error::InvalidPacketSize);
        }

        let mut head = [0u8; 8];
        self.inner.read_exact(&mut head)?;
        let compressed_len = u16::from_le_bytes([head[0], head[1]]) as usize;
        let decompressed_len = u16::from_le_bytes([head[2], head[3]]) as usize;
        let stored = u32::from_le_bytes([head[4], head[5], head[6], head[7]]);

        let mut compressed = vec![0u8; compressed_len];
        self.inner.read_exact(&mut compressed)?;
        if stored != block_checksum(&head, &compressed) {
            return Err(W3Error::InvalidChecksum);
        }

        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut data = Vec::with_capacity(decompressed_len);
        decoder.read_to_end(&mut data)?;
        if data.len() != decompressed_len {
            return Err(W3Error::BadFormat);
        }

        let take = data.len().min(self.payload_left as usize);
        self.buf.write_blob(&data[..take]);
        self.payload_left -= take as u32;
        self.blocks_left -= 1;
        Ok(())
    }
}

/// Streaming record writer.
///
/// A placeholder header goes out first; [`RecordEncoder::finish`] flushes
/// the final padded block, seeks back, and rewrites the header with the
/// measured totals and CRC.
pub struct RecordEncoder<W: Write + Seek> {
    inner: W,
    pub header: Header,
    pub encoding: Encoding,
    buf: PacketBuffer,
    num_blocks: u32,
    decompressed_size: u32,
    block_bytes: u32,
}

impl<W: Write + Seek> RecordEncoder<W> {
    pub fn new(mut inner: W, header: Header) -> Result<Self> {
        inner.write_all(&[0u8; HEADER_SIZE as usize])?;
        let encoding = Encoding::new(header.game_version.version);

        Ok(Self {
            inner,
            header,
            encoding,
            buf: PacketBuffer::with_capacity(2 * BLOCK_SIZE),
            num_blocks: 0,
            decompressed_size: 0,
            block_bytes: 0,
        })
    }

    /// Appends one record to the payload and returns its encoded size.
    pub fn write_record(&mut self, rec: &Record) -> Result<usize> {
        let n = rec.serialize(&mut self.buf, &self.encoding)?;
        self.decompressed_size += n as u32;
        while self.buf.size() >= BLOCK_SIZE {
            self.flush_block()?;
        }
        Ok(n)
    }

    fn flush_block(&mut self) -> Result<()> {
        let take = self.buf.size().min(BLOCK_SIZE);
        let mut chunk = self.buf.read_blob(take);
        chunk.resize(BLOCK_SIZE, 0);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&chunk)?;
        let compressed = encoder.finish()?;

        let mut head = [0u8; 8];
        head[..2].copy_from_slice(&(compressed.len() as u16).to_le_bytes());
        head[2..4].copy_from_slice(&(BLOCK_SIZE as u16).to_le_bytes());
        let checksum = block_checksum(&head, &compressed);
        head[4..8].copy_from_slice(&checksum.to_le_bytes());

        self.inner.write_all(&head)?;
        self.inner.write_all(&compressed)?;
        self.num_blocks += 1;
        self.block_bytes += 8 + compressed.len() as u32;
        Ok(())
    }

    /// Flushes pending payload and back-fills the header. Returns the
    /// underlying writer positioned at the end of the file.
    pub fn finish(mut self) -> Result<W> {
        while !self.buf.is_empty() {
            self.flush_block()?;
        }

        let info = ContainerInfo {
            compressed_size: HEADER_SIZE + self.block_bytes,
            decompressed_size: self.decompressed_size,
            num_blocks: self.num_blocks,
        };

        let mut hbuf = PacketBuffer::with_capacity(HEADER_SIZE as usize);
        self.header.serialize(&mut hbuf, &info)?;

        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_all(hbuf.as_slice())?;
        self.inner.seek(SeekFrom::End(0))?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::records::{
        ChatMessage, CountDownEnd, CountDownStart, GameStart, TimeSlot, TimeSlotAck,
    };
    use crate::find_header;
    use w3net_protocol::w3gs::{
        self, GameVersion, Message, PlayerAction, MSG_CHAT_EXTRA, SCOPE_ALL,
    };

    fn sample_header() -> Header {
        Header {
            game_version: GameVersion {
                product: w3gs::PRODUCT_TFT,
                version: 26,
            },
            build_number: 6059,
            duration_ms: 0,
            single_player: false,
        }
    }

    fn sample_records() -> Vec<Record> {
        let mut records = vec![
            Record::CountDownStart(CountDownStart),
            Record::CountDownEnd(CountDownEnd),
            Record::GameStart(GameStart),
            Record::ChatMessage(ChatMessage {
                message: Message {
                    recipient_ids: vec![],
                    sender_id: 1,
                    msg_type: MSG_CHAT_EXTRA,
                    scope: SCOPE_ALL,
                    new_val: 0,
                    content: "let's go".to_string(),
                },
            }),
        ];

        // Enough ticks to force several blocks.
        for i in 0..4000u32 {
            records.push(Record::TimeSlot(TimeSlot {
                time_slot: w3gs::TimeSlot {
                    fragment: false,
                    time_increment_ms: 100,
                    actions: vec![PlayerAction {
                        player_id: (i % 8) as u8 + 1,
                        data: vec![0x16, (i & 0xFF) as u8],
                    }],
                },
            }));
            records.push(Record::TimeSlotAck(TimeSlotAck {
                checksum: i.to_le_bytes().to_vec(),
            }));
        }
        records
    }

    #[test]
    fn stream_roundtrip_across_blocks() {
        let records = sample_records();

        let mut encoder = RecordEncoder::new(Cursor::new(Vec::new()), sample_header()).unwrap();
        for rec in &records {
            encoder.write_record(rec).unwrap();
        }
        let file = encoder.finish().unwrap().into_inner();

        let mut decoder = RecordDecoder::new(Cursor::new(&file)).unwrap();
        assert_eq!(decoder.header, sample_header());

        let mut decoded = Vec::new();
        while let Some(rec) = decoder.next_record().unwrap() {
            decoded.push(rec);
        }
        assert_eq!(decoded.len(), records.len());
        assert_eq!(decoded, records);
    }

    #[test]
    fn empty_stream_yields_no_records() {
        let encoder = RecordEncoder::new(Cursor::new(Vec::new()), sample_header()).unwrap();
        let file = encoder.finish().unwrap().into_inner();
        assert_eq!(file.len(), HEADER_SIZE as usize);

        let mut decoder = RecordDecoder::new(Cursor::new(&file)).unwrap();
        assert_eq!(decoder.next_record().unwrap(), None);
        assert_eq!(decoder.next_record().unwrap(), None);
    }

    #[test]
    fn for_each_visits_all_records() {
        let mut encoder = RecordEncoder::new(Cursor::new(Vec::new()), sample_header()).unwrap();
        for _ in 0..10 {
            encoder.write_record(&Record::GameStart(GameStart)).unwrap();
        }
        let file = encoder.finish().unwrap().into_inner();

        let mut count = 0;
        RecordDecoder::new(Cursor::new(&file))
            .unwrap()
            .for_each(|_| {
                count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 10);
    }

    #[test]
    fn tampered_block_fails_checksum() {
        let mut encoder = RecordEncoder::new(Cursor::new(Vec::new()), sample_header()).unwrap();
        encoder.write_record(&Record::GameStart(GameStart)).unwrap();
        let mut file = encoder.finish().unwrap().into_inner();

        let tampered = file.len() - 1;
        file[tampered] ^= 0xFF;

        let mut decoder = RecordDecoder::new(Cursor::new(&file)).unwrap();
        assert_eq!(decoder.next_record(), Err(W3Error::InvalidChecksum));
    }

    #[test]
    fn decoder_accepts_scan_located_header() {
        let mut encoder = RecordEncoder::new(Cursor::new(Vec::new()), sample_header()).unwrap();
        encoder.write_record(&Record::GameStart(GameStart)).unwrap();
        let file = encoder.finish().unwrap().into_inner();

        let mut prefixed = b"nwg wrapper junk".to_vec();
        prefixed.extend_from_slice(&file);

        let offset = find_header(&prefixed).unwrap();
        let mut decoder = RecordDecoder::new(Cursor::new(&prefixed[offset..])).unwrap();
        assert_eq!(
            decoder.next_record().unwrap(),
            Some(Record::GameStart(GameStart))
        );
    }
}
