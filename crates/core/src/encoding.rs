//! Encoding options threaded through (de)serialization
//!
//! Several record tags changed meaning across game patches, so every
//! serialize/deserialize call receives an [`Encoding`] describing the
//! dialect in play. It is input data, not global state: two buffers can be
//! decoded under different versions concurrently.

use serde::{Deserialize, Serialize};

/// Options for (de)serialization.
///
/// `game_version` is the patch level of the peer or the replay
/// (e.g. 26 for 1.26, 30 for 1.30). Zero means "current" and selects the
/// modern interpretation of version-dependent tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Encoding {
    pub game_version: u32,
}

impl Encoding {
    pub const fn new(game_version: u32) -> Self {
        Self { game_version }
    }
}
