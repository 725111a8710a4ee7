//! Tag-to-constructor factories
//!
//! Deserialization is two-phase: a factory maps the tag byte to a fresh,
//! empty value of the right variant, then the variant's own `deserialize`
//! fills it in. Each protocol family ships a default factory built from a
//! plain match table; [`FactoryCache`] wraps any factory and memoizes the
//! constructed prototype per `(tag, game_version)` so that hot decode loops
//! skip the version-conditional construction path.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::Encoding;

/// Maps a tag byte to a fresh value of the matching variant.
///
/// Factories are read-only after construction and safe to share across
/// threads. A `None` return means the tag is unknown to this family; the
/// framing layer decides whether that falls back to an unknown-packet
/// capture or surfaces [`crate::W3Error::NoFactory`].
pub trait PacketFactory<T> {
    fn new_instance(&self, tag: u8, enc: &Encoding) -> Option<T>;
}

impl<T, F> PacketFactory<T> for &F
where
    F: PacketFactory<T>,
{
    fn new_instance(&self, tag: u8, enc: &Encoding) -> Option<T> {
        F::new_instance(self, tag, enc)
    }
}

/// Memoizing wrapper around a base factory.
///
/// Construction patterns are keyed by `(tag, game_version)`; the observable
/// behavior is identical to the wrapped factory. Reads take a shared lock,
/// the first construction for a key takes the write lock once.
pub struct FactoryCache<F, T> {
    base: F,
    cache: RwLock<HashMap<(u8, u32), T>>,
}

impl<F, T> FactoryCache<F, T>
where
    F: PacketFactory<T>,
    T: Clone,
{
    pub fn new(base: F) -> Self {
        Self {
            base,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl<F, T> PacketFactory<T> for FactoryCache<F, T>
where
    F: PacketFactory<T>,
    T: Clone,
{
    fn new_instance(&self, tag: u8, enc: &Encoding) -> Option<T> {
        let key = (tag, enc.game_version);
        if let Some(proto) = self.cache.read().get(&key) {
            return Some(proto.clone());
        }

        let proto = self.base.new_instance(tag, enc)?;
        self.cache.write().insert(key, proto.clone());
        Some(proto)
    }
}
