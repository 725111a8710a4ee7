//! w3net Core - error taxonomy, encoding options, and factory plumbing

mod encoding;
mod error;
mod factory;

pub use encoding::*;
pub use error::*;
pub use factory::*;
