//! # w3net Replay Library
//!
//! Codec for the replay container format: a fixed 68-byte file header, a
//! zlib-compressed block stream, and the tagged record payload inside it.
//! Records reuse the game-session structures from [`w3net_protocol::w3gs`]
//! wherever a record wraps a wire structure, so a replay can be replayed
//! onto a live connection without re-encoding.
//!
//! ## Layers
//!
//! - [`records`]: the record catalog, tag table, and factories. Operates
//!   on in-memory buffers; this is where the version-dependent tag
//!   semantics live.
//! - [`Header`] / [`find_header`]: the file header codec, including the
//!   signature scan for files with prepended third-party sub-headers.
//! - [`RecordDecoder`] / [`RecordEncoder`]: the compressed block stream
//!   over `io::Read` / `io::Write + io::Seek`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use w3net_replay::RecordDecoder;
//!
//! let file = File::open("last_replay.w3g")?;
//! let mut decoder = RecordDecoder::new(BufReader::new(file))?;
//! println!("patch level {}", decoder.header.game_version.version);
//! while let Some(record) = decoder.next_record()? {
//!     println!("{record:?}");
//! }
//! # Ok::<(), w3net_core::W3Error>(())
//! ```

mod header;
pub mod records;
mod stream;

pub use header::*;
pub use records::{
    deserialize_record, deserialize_record_with, serialize_record, DefaultFactory, Record,
};
pub use stream::*;
